//! User domain errors

use thiserror::Error;

use core_kernel::{PortError, UserId};

/// Errors that can occur in the user domain
#[derive(Debug, Error)]
pub enum UserError {
    /// User with the given ID was not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The acting user may not perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Input failed validation
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Another user already holds this email address
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    /// A lecturer has no usable hourly rate
    #[error("Hourly rate not configured for {0}")]
    RateNotConfigured(UserId),

    /// The user store failed
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl UserError {
    /// Creates a UserNotFound error from any ID type
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        UserError::UserNotFound(id.to_string())
    }

    /// Creates an Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        UserError::Unauthorized(message.into())
    }

    /// Creates a ValidationFailed error
    pub fn validation(message: impl Into<String>) -> Self {
        UserError::ValidationFailed(message.into())
    }

    /// Translates a store error, keeping not-found distinct from storage failures
    pub(crate) fn from_port(id: UserId, error: PortError) -> Self {
        if error.is_not_found() {
            UserError::not_found(id)
        } else {
            UserError::Storage(error)
        }
    }
}
