//! Custom Test Assertions
//!
//! Assertion helpers for claims that give more meaningful failure messages
//! than a bare `assert_eq!` on the whole struct.

use rust_decimal::Decimal;

use domain_claims::{Claim, ClaimError, ClaimStatus};

/// Asserts that a claim's total is exactly hours x rate
pub fn assert_total_consistent(claim: &Claim) {
    assert_eq!(
        claim.total_amount(),
        claim.hours_worked() * claim.hourly_rate(),
        "Claim {} total {} != {} x {}",
        claim.claim_number,
        claim.total_amount(),
        claim.hours_worked(),
        claim.hourly_rate()
    );
}

/// Asserts a claim's status
pub fn assert_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} is {}, expected {}",
        claim.claim_number, claim.status, expected
    );
}

/// Asserts a claim's total amount
pub fn assert_total(claim: &Claim, expected: Decimal) {
    assert_eq!(
        claim.total_amount(),
        expected,
        "Claim {} total is {}, expected {}",
        claim.claim_number,
        claim.total_amount(),
        expected
    );
}

/// Asserts that an operation failed with `InvalidTransition` from `status`
pub fn assert_invalid_transition<T: std::fmt::Debug>(result: Result<T, ClaimError>, status: ClaimStatus) {
    match result {
        Err(ClaimError::InvalidTransition { status: actual, .. }) => assert_eq!(
            actual, status,
            "InvalidTransition reported status {}, expected {}",
            actual, status
        ),
        other => panic!("Expected InvalidTransition from {}, got {:?}", status, other),
    }
}

/// Asserts that an operation failed with `Unauthorized`
pub fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ClaimError>) {
    assert!(
        matches!(result, Err(ClaimError::Unauthorized(_))),
        "Expected Unauthorized, got {:?}",
        result
    );
}

/// Asserts that an operation failed with `ValidationFailed`
pub fn assert_validation_failed<T: std::fmt::Debug>(result: Result<T, ClaimError>) {
    assert!(
        matches!(result, Err(ClaimError::ValidationFailed(_))),
        "Expected ValidationFailed, got {:?}",
        result
    );
}
