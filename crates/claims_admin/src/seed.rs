//! Default user seeding
//!
//! A fresh database gets one user per role so the workflow can be driven end
//! to end. Users are matched by email; existing accounts are never modified.

use rust_decimal_macros::dec;
use tracing::{debug, info, instrument};

use core_kernel::PortError;
use domain_users::{Role, User, UserPort};

/// The accounts created on first start
pub fn default_users() -> Vec<User> {
    vec![
        User::new("Kekeletso Mokete", "hr@example.com", Role::Hr, "Human Resources"),
        User::lecturer(
            "Chuma Makhathini",
            "chuma.makhathini@example.com",
            "Computer Science",
            dec!(350.00),
        ),
        User::new(
            "Muzi Sithole",
            "muzi.sithole@example.com",
            Role::Coordinator,
            "Head of Computer Science",
        ),
        User::new(
            "Ouma Stella",
            "ouma.stella@example.com",
            Role::Manager,
            "Head of School of IT",
        ),
    ]
}

/// Inserts each of `users` whose email is not yet registered
///
/// Returns the number of users inserted.
#[instrument(skip(port, users), fields(candidates = users.len()))]
pub async fn seed_users(port: &dyn UserPort, users: Vec<User>) -> Result<usize, PortError> {
    let mut inserted = 0;
    for user in users {
        if port.find_by_email(&user.email).await?.is_some() {
            debug!(email = %user.email, "User already present");
            continue;
        }
        port.insert_user(&user).await?;
        info!(email = %user.email, role = %user.role, "Seeded user");
        inserted += 1;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_users::MockUserPort;

    #[test]
    fn test_one_user_per_role() {
        let users = default_users();
        for role in [Role::Lecturer, Role::Coordinator, Role::Manager, Role::Hr] {
            assert_eq!(users.iter().filter(|u| u.role == role).count(), 1);
        }
        let lecturer = users.iter().find(|u| u.role == Role::Lecturer).unwrap();
        assert_eq!(lecturer.effective_hourly_rate(), Some(dec!(350)));
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let port = MockUserPort::new();

        assert_eq!(seed_users(&port, default_users()).await.unwrap(), 4);
        assert_eq!(seed_users(&port, default_users()).await.unwrap(), 0);
        assert_eq!(port.list_users().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_existing_email_is_kept() {
        let mut existing = User::new("Renamed HR", "HR@example.com", Role::Hr, "People");
        existing.is_active = false;
        let port = MockUserPort::with_users(vec![existing.clone()]).await;

        assert_eq!(seed_users(&port, default_users()).await.unwrap(), 3);
        let stored = port.get_user(existing.id).await.unwrap();
        assert_eq!(stored.full_name, "Renamed HR");
        assert!(!stored.is_active);
    }
}
