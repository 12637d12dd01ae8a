//! Property-Based Test Generators
//!
//! Proptest strategies that stay inside the domain's input rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::ClaimStatus;

/// Hours between 0.50 and 180.00 in hundredths
pub fn valid_hours_strategy() -> impl Strategy<Value = Decimal> {
    (50i64..=18_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Hours outside the default policy bounds
pub fn out_of_range_hours_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (-1_000i64..50i64).prop_map(|n| Decimal::new(n, 2)),
        (18_001i64..100_000i64).prop_map(|n| Decimal::new(n, 2)),
    ]
}

/// Lecturer rates between R50.00 and R1000.00
pub fn valid_rate_strategy() -> impl Strategy<Value = Decimal> {
    (5_000i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Any claim status
pub fn claim_status_strategy() -> impl Strategy<Value = ClaimStatus> {
    proptest::sample::select(ClaimStatus::ALL.to_vec())
}
