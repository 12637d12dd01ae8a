//! Claims domain errors

use thiserror::Error;

use core_kernel::{PortError, UserId};
use domain_users::UserError;

use crate::claim::ClaimStatus;
use crate::workflow::Operation;

/// Errors that can occur in the claims domain
///
/// A failed operation never changes the stored claim.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Cannot {operation} a claim in status {status}")]
    InvalidTransition { operation: Operation, status: ClaimStatus },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Hourly rate not configured for {0}")]
    RateNotConfigured(UserId),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl ClaimError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        ClaimError::NotFound { entity, id: id.to_string() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ClaimError::Unauthorized(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::ValidationFailed(message.into())
    }

    /// Translates a store error, keeping not-found distinct from storage failures
    pub(crate) fn from_port(entity: &'static str, id: impl std::fmt::Display, error: PortError) -> Self {
        if error.is_not_found() {
            ClaimError::not_found(entity, id)
        } else {
            ClaimError::Storage(error)
        }
    }
}

impl From<UserError> for ClaimError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound(id) => ClaimError::NotFound { entity: "User", id },
            UserError::Unauthorized(message) => ClaimError::Unauthorized(message),
            UserError::ValidationFailed(message) => ClaimError::ValidationFailed(message),
            UserError::DuplicateEmail(email) => {
                ClaimError::ValidationFailed(format!("email {} already in use", email))
            }
            UserError::RateNotConfigured(id) => ClaimError::RateNotConfigured(id),
            UserError::Storage(e) => ClaimError::Storage(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = ClaimError::InvalidTransition {
            operation: Operation::Approve,
            status: ClaimStatus::Submitted,
        };
        assert_eq!(err.to_string(), "Cannot approve a claim in status Submitted");
    }

    #[test]
    fn test_user_errors_map_across() {
        let id = UserId::new();
        assert!(matches!(
            ClaimError::from(UserError::RateNotConfigured(id)),
            ClaimError::RateNotConfigured(x) if x == id
        ));
        assert!(matches!(
            ClaimError::from(UserError::not_found(id)),
            ClaimError::NotFound { entity: "User", .. }
        ));
    }

    #[test]
    fn test_port_not_found_maps_to_not_found() {
        let err = ClaimError::from_port("Claim", "x", PortError::not_found("Claim", "x"));
        assert!(matches!(err, ClaimError::NotFound { entity: "Claim", .. }));

        let err = ClaimError::from_port("Claim", "x", PortError::connection("down"));
        assert!(matches!(err, ClaimError::Storage(_)));
    }
}
