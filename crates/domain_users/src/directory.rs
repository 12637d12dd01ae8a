//! Role and rate resolution
//!
//! The workflow never trusts a role or rate passed in by its caller. Every
//! role-gated operation resolves the actor here, against the user store, at
//! the moment the operation runs.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use core_kernel::UserId;

use crate::error::UserError;
use crate::ports::UserPort;
use crate::session::SessionPort;
use crate::user::{ActorProfile, Role};

/// Resolves roles and authorized rates from the user store
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserPort>,
}

impl UserDirectory {
    /// Creates a directory over the given user store
    pub fn new(users: Arc<dyn UserPort>) -> Self {
        Self { users }
    }

    /// Returns the role, active flag and usable rate of a user
    ///
    /// # Errors
    ///
    /// `UserError::UserNotFound` if the id does not resolve.
    pub async fn resolve(&self, id: UserId) -> Result<ActorProfile, UserError> {
        let user = self
            .users
            .get_user(id)
            .await
            .map_err(|e| UserError::from_port(id, e))?;
        Ok(user.profile())
    }

    /// Resolves an active user holding one of `allowed`
    ///
    /// # Errors
    ///
    /// `UserError::Unauthorized` if the user is deactivated or holds another role.
    pub async fn require_role(&self, id: UserId, allowed: &[Role]) -> Result<ActorProfile, UserError> {
        let profile = self.resolve(id).await?;

        if !profile.is_active {
            debug!(user_id = %id, "Rejected deactivated user");
            return Err(UserError::unauthorized(format!("user {} is deactivated", id)));
        }

        if !allowed.contains(&profile.role) {
            debug!(user_id = %id, role = %profile.role, "Rejected role");
            return Err(UserError::unauthorized(format!(
                "role {} may not perform this action",
                profile.role
            )));
        }

        Ok(profile)
    }

    /// Returns the hourly rate HR has authorized for a lecturer
    ///
    /// # Errors
    ///
    /// * `UserError::Unauthorized` if the user is not an active lecturer
    /// * `UserError::RateNotConfigured` if the lecturer has no positive rate
    pub async fn authorized_rate(&self, id: UserId) -> Result<Decimal, UserError> {
        let profile = self.require_role(id, &[Role::Lecturer]).await?;
        profile.hourly_rate.ok_or(UserError::RateNotConfigured(id))
    }

    /// Resolves the signed-in user of a session against the store
    ///
    /// The role carried by the session is not trusted; the stored profile is
    /// returned instead, so a role change by HR takes effect immediately.
    pub async fn current_profile(&self, session: &dyn SessionPort) -> Result<ActorProfile, UserError> {
        let actor = session
            .current_actor()
            .ok_or_else(|| UserError::unauthorized("no signed-in user"))?;

        let profile = self.resolve(actor.user_id).await?;
        if !profile.is_active {
            return Err(UserError::unauthorized(format!("user {} is deactivated", actor.user_id)));
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockUserPort;
    use crate::session::StaticSession;
    use crate::user::User;
    use rust_decimal_macros::dec;

    async fn directory_with(users: Vec<User>) -> UserDirectory {
        UserDirectory::new(Arc::new(MockUserPort::with_users(users).await))
    }

    #[tokio::test]
    async fn test_authorized_rate_for_lecturer() {
        let lecturer = User::lecturer("Chuma Makhathini", "chuma@example.com", "CS", dec!(350));
        let directory = directory_with(vec![lecturer.clone()]).await;

        assert_eq!(directory.authorized_rate(lecturer.id).await.unwrap(), dec!(350));
    }

    #[tokio::test]
    async fn test_authorized_rate_missing() {
        let mut lecturer = User::lecturer("Chuma Makhathini", "chuma@example.com", "CS", dec!(350));
        lecturer.hourly_rate = None;
        let directory = directory_with(vec![lecturer.clone()]).await;

        let result = directory.authorized_rate(lecturer.id).await;
        assert!(matches!(result, Err(UserError::RateNotConfigured(id)) if id == lecturer.id));
    }

    #[tokio::test]
    async fn test_require_role_rejects_inactive() {
        let mut coordinator = User::new("Muzi Sithole", "muzi@example.com", Role::Coordinator, "CS");
        coordinator.is_active = false;
        let directory = directory_with(vec![coordinator.clone()]).await;

        let result = directory.require_role(coordinator.id, &[Role::Coordinator]).await;
        assert!(matches!(result, Err(UserError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_resolve_unknown_user() {
        let directory = directory_with(vec![]).await;
        let result = directory.resolve(UserId::new()).await;
        assert!(matches!(result, Err(UserError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_current_profile_uses_stored_role() {
        let manager = User::new("Ouma Stella", "ouma@example.com", Role::Manager, "IT");
        let directory = directory_with(vec![manager.clone()]).await;

        // The session still believes this user is a coordinator.
        let stale = crate::user::Actor { user_id: manager.id, role: Role::Coordinator };
        let profile = directory
            .current_profile(&StaticSession::signed_in(stale))
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_current_profile_anonymous() {
        let directory = directory_with(vec![]).await;
        let result = directory.current_profile(&StaticSession::anonymous()).await;
        assert!(matches!(result, Err(UserError::Unauthorized(_))));
    }
}
