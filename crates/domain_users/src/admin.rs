//! HR user administration
//!
//! HR creates and maintains user accounts and is the only role that sets a
//! lecturer's hourly rate. Password handling belongs to the authentication
//! layer and is not modelled here.
//!
//! # Rules
//!
//! - Every operation requires an active HR actor
//! - Emails are unique, compared case-insensitively
//! - Lecturers must have a rate between R50 and R1000; other roles never store one
//! - Deactivation is a soft delete and HR cannot deactivate themselves

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use core_kernel::{PortError, UserId};

use crate::directory::UserDirectory;
use crate::error::UserError;
use crate::ports::UserPort;
use crate::user::{Role, User};

const MIN_HOURLY_RATE: Decimal = dec!(50);
const MAX_HOURLY_RATE: Decimal = dec!(1000);

/// Request for creating a user account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email, length(max = 256))]
    pub email: String,
    pub role: Role,
    #[validate(length(min = 1, max = 200))]
    pub department: String,
    /// Required for lecturers, ignored otherwise
    pub hourly_rate: Option<Decimal>,
}

/// Request for editing a user account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email, length(max = 256))]
    pub email: String,
    pub role: Role,
    #[validate(length(min = 1, max = 200))]
    pub department: String,
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
}

/// HR-facing user management service
#[derive(Clone)]
pub struct UserAdministration {
    users: Arc<dyn UserPort>,
    directory: UserDirectory,
}

impl UserAdministration {
    /// Creates the service over a user store
    pub fn new(users: Arc<dyn UserPort>) -> Self {
        Self {
            directory: UserDirectory::new(users.clone()),
            users,
        }
    }

    /// Creates a new, active user account
    ///
    /// # Errors
    ///
    /// * `Unauthorized` unless `actor` is an active HR user
    /// * `ValidationFailed` for malformed fields or a missing lecturer rate
    /// * `DuplicateEmail` if the email is already registered
    #[instrument(skip(self, request), fields(actor = %actor, role = %request.role))]
    pub async fn create_user(&self, actor: UserId, request: CreateUserRequest) -> Result<User, UserError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        request
            .validate()
            .map_err(|e| UserError::validation(e.to_string()))?;
        let hourly_rate = checked_rate(request.role, request.hourly_rate)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(UserError::DuplicateEmail(request.email.to_lowercase()));
        }

        let mut user = User::new(request.full_name, request.email, request.role, request.department);
        user.hourly_rate = hourly_rate;

        self.users
            .insert_user(&user)
            .await
            .map_err(|e| duplicate_or_storage(e, &user.email))?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Edits a user's profile, role, rate and active flag
    ///
    /// Changing a lecturer's rate affects every claim they edit afterwards,
    /// including claims already in `Draft` or `Returned`.
    #[instrument(skip(self, request), fields(actor = %actor, user_id = %id))]
    pub async fn update_user(
        &self,
        actor: UserId,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<User, UserError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        request
            .validate()
            .map_err(|e| UserError::validation(e.to_string()))?;
        if actor == id && !request.is_active {
            return Err(UserError::validation("you cannot deactivate your own account"));
        }
        if actor == id && request.role != Role::Hr {
            return Err(UserError::validation("you cannot change your own role"));
        }
        let hourly_rate = checked_rate(request.role, request.hourly_rate)?;

        let mut user = self
            .users
            .get_user(id)
            .await
            .map_err(|e| UserError::from_port(id, e))?;

        let email = request.email.to_lowercase();
        if email != user.email {
            if let Some(existing) = self.users.find_by_email(&email).await? {
                if existing.id != id {
                    return Err(UserError::DuplicateEmail(email));
                }
            }
        }

        user.full_name = request.full_name;
        user.email = email;
        user.role = request.role;
        user.department = request.department;
        user.hourly_rate = hourly_rate;
        user.is_active = request.is_active;
        user.updated_at = Utc::now();

        self.users
            .update_user(&user)
            .await
            .map_err(|e| duplicate_or_storage(e, &user.email))?;

        info!("User updated");
        Ok(user)
    }

    /// Soft-deletes a user by clearing the active flag
    #[instrument(skip(self), fields(actor = %actor, user_id = %id))]
    pub async fn deactivate_user(&self, actor: UserId, id: UserId) -> Result<User, UserError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        if actor == id {
            return Err(UserError::validation("you cannot deactivate your own account"));
        }

        let mut user = self
            .users
            .get_user(id)
            .await
            .map_err(|e| UserError::from_port(id, e))?;
        user.is_active = false;
        user.updated_at = Utc::now();
        self.users.update_user(&user).await?;

        info!("User deactivated");
        Ok(user)
    }

    /// Lists all users ordered by role, then name
    pub async fn list_users(&self, actor: UserId) -> Result<Vec<User>, UserError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        let mut users = self.users.list_users().await?;
        users.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.full_name.cmp(&b.full_name)));
        Ok(users)
    }

    /// Lists active lecturers ordered by name
    pub async fn list_lecturers(&self, actor: UserId) -> Result<Vec<User>, UserError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        let mut lecturers: Vec<User> = self
            .users
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role == Role::Lecturer && u.is_active)
            .collect();
        lecturers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(lecturers)
    }
}

/// Applies the lecturer-rate rule, returning the rate to store
fn checked_rate(role: Role, rate: Option<Decimal>) -> Result<Option<Decimal>, UserError> {
    if role != Role::Lecturer {
        return Ok(None);
    }

    match rate {
        None => Err(UserError::validation("hourly rate is required for lecturers")),
        Some(rate) if rate < MIN_HOURLY_RATE || rate > MAX_HOURLY_RATE => Err(UserError::validation(
            format!("hourly rate must be between R{} and R{}", MIN_HOURLY_RATE, MAX_HOURLY_RATE),
        )),
        Some(rate) if rate.normalize().scale() > 2 => Err(UserError::validation(
            "hourly rate may have at most two decimal places",
        )),
        Some(rate) => Ok(Some(rate)),
    }
}

fn duplicate_or_storage(error: PortError, email: &str) -> UserError {
    if error.is_conflict() {
        UserError::DuplicateEmail(email.to_string())
    } else {
        UserError::Storage(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_rate_drops_rate_for_reviewers() {
        assert_eq!(checked_rate(Role::Manager, Some(dec!(400))).unwrap(), None);
    }

    #[test]
    fn test_checked_rate_bounds() {
        assert!(checked_rate(Role::Lecturer, Some(dec!(49.99))).is_err());
        assert!(checked_rate(Role::Lecturer, Some(dec!(1000.01))).is_err());
        assert_eq!(checked_rate(Role::Lecturer, Some(dec!(50))).unwrap(), Some(dec!(50)));
        assert!(checked_rate(Role::Lecturer, None).is_err());
        assert!(checked_rate(Role::Lecturer, Some(dec!(350.125))).is_err());
    }
}
