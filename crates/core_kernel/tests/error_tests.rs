//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::PortError;

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    let CoreError::Configuration(msg) = error;
    assert_eq!(msg, "Missing config");
}

#[test]
fn test_core_error_display() {
    let error = CoreError::configuration("database url is required");
    assert_eq!(error.to_string(), "Configuration error: database url is required");
}

#[test]
fn test_port_error_validation_field() {
    let error = PortError::validation_field("must be positive", "hourly_rate");

    match error {
        PortError::Validation { message, field } => {
            assert_eq!(message, "must be positive");
            assert_eq!(field.as_deref(), Some("hourly_rate"));
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_display() {
    let error = PortError::not_found("User", "USR-1");
    assert_eq!(error.to_string(), "Not found: User with id USR-1");
}
