//! User Domain Ports
//!
//! The `UserPort` trait is the user store consumed by the directory and by HR
//! administration. Adapters:
//!
//! - **PostgreSQL adapter**: `infra_db::adapters::PostgresUserAdapter`
//! - **Mock adapter**: in-memory map for tests and local development
//!
//! ```rust,ignore
//! let users: Arc<dyn UserPort> = Arc::new(PostgresUserAdapter::new(pool));
//! let directory = UserDirectory::new(users.clone());
//! ```

use async_trait::async_trait;

use core_kernel::{UserId, PortError, DomainPort, HealthCheckable};

use crate::user::User;

/// The user store
#[async_trait]
pub trait UserPort: DomainPort + HealthCheckable {
    /// Retrieves a user by ID, or `PortError::NotFound`
    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// Finds a user by email, compared case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError>;

    /// Lists every user, active or not
    async fn list_users(&self) -> Result<Vec<User>, PortError>;

    /// Stores a new user
    ///
    /// Fails with `PortError::Conflict` when the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), PortError>;

    /// Replaces an existing user
    async fn update_user(&self, user: &User) -> Result<(), PortError>;
}

/// Mock implementation of UserPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of UserPort
    #[derive(Debug, Default, Clone)]
    pub struct MockUserPort {
        users: Arc<RwLock<HashMap<UserId, User>>>,
    }

    impl MockUserPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with users for testing
        pub async fn with_users(users: Vec<User>) -> Self {
            let port = Self::new();
            {
                let mut map = port.users.write().await;
                for user in users {
                    map.insert(user.id, user);
                }
            }
            port
        }
    }

    impl DomainPort for MockUserPort {}

    #[async_trait]
    impl HealthCheckable for MockUserPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-user-port")
        }
    }

    #[async_trait]
    impl UserPort for MockUserPort {
        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
            let email = email.to_lowercase();
            Ok(self
                .users
                .read()
                .await
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn list_users(&self) -> Result<Vec<User>, PortError> {
            Ok(self.users.read().await.values().cloned().collect())
        }

        async fn insert_user(&self, user: &User) -> Result<(), PortError> {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.email == user.email) {
                return Err(PortError::conflict(format!("email {} already in use", user.email)));
            }
            users.insert(user.id, user.clone());
            Ok(())
        }

        async fn update_user(&self, user: &User) -> Result<(), PortError> {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.id != user.id && u.email == user.email) {
                return Err(PortError::conflict(format!("email {} already in use", user.email)));
            }
            let slot = users
                .get_mut(&user.id)
                .ok_or_else(|| PortError::not_found("User", user.id))?;
            *slot = user.clone();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockUserPort;
    use super::*;
    use crate::user::Role;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_port_insert_and_get() {
        let port = MockUserPort::new();
        let user = User::lecturer("Chuma Makhathini", "chuma@example.com", "CS", dec!(350));

        port.insert_user(&user).await.unwrap();

        let retrieved = port.get_user(user.id).await.unwrap();
        assert_eq!(retrieved, user);
    }

    #[tokio::test]
    async fn test_mock_port_not_found() {
        let port = MockUserPort::new();
        let result = port.get_user(UserId::new_v7()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_port_duplicate_email() {
        let port = MockUserPort::new();
        port.insert_user(&User::new("A", "same@example.com", Role::Hr, "HR")).await.unwrap();

        let result = port.insert_user(&User::new("B", "SAME@example.com", Role::Manager, "IT")).await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_mock_port_find_by_email_ignores_case() {
        let user = User::new("Muzi Sithole", "muzi@example.com", Role::Coordinator, "CS");
        let port = MockUserPort::with_users(vec![user.clone()]).await;

        let found = port.find_by_email("MUZI@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_mock_port_health_check() {
        let port = MockUserPort::new();
        let result = port.health_check().await;
        assert_eq!(result.status, core_kernel::AdapterHealth::Healthy);
    }
}
