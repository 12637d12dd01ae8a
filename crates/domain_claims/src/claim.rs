//! Claim aggregate

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, UserId};

use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Captured by the lecturer, not yet sent for review
    Draft,
    /// Waiting for a coordinator
    Submitted,
    /// Verified by a coordinator, waiting for a manager
    Verified,
    /// Approved by a manager
    Approved,
    /// Rejected by a reviewer
    Rejected,
    /// Sent back to the lecturer for changes
    Returned,
}

impl ClaimStatus {
    /// Every status, in lifecycle order
    pub const ALL: [ClaimStatus; 6] = [
        ClaimStatus::Draft,
        ClaimStatus::Submitted,
        ClaimStatus::Verified,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
        ClaimStatus::Returned,
    ];

    /// Returns the storage code for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::Verified => "verified",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Returned => "returned",
        }
    }

    /// The lecturer may change the claim
    pub fn can_edit(&self) -> bool {
        matches!(self, ClaimStatus::Draft | ClaimStatus::Returned)
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, ClaimStatus::Draft | ClaimStatus::Returned)
    }

    pub fn can_verify(&self) -> bool {
        matches!(self, ClaimStatus::Submitted)
    }

    pub fn can_approve(&self) -> bool {
        matches!(self, ClaimStatus::Verified)
    }

    /// Only a coordinator's queue can send a claim back
    pub fn can_return(&self) -> bool {
        matches!(self, ClaimStatus::Submitted)
    }

    pub fn can_reject(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::Verified)
    }

    /// Approved and rejected claims never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected)
    }

    /// Waiting on a reviewer
    pub fn is_pending(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::Verified)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClaimStatus::Draft => "Draft",
            ClaimStatus::Submitted => "Submitted",
            ClaimStatus::Verified => "Verified",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
            ClaimStatus::Returned => "Returned",
        };
        f.write_str(label)
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown claim status '{}'", s))
    }
}

/// Lecturer input for creating or editing a claim
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClaimRequest {
    #[validate(length(min = 1, max = 1000))]
    pub work_description: String,
    /// Checked against the workflow policy's hour bounds
    pub hours_worked: Decimal,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// hours x rate, or `None` if the product does not fit a decimal
pub fn compute_total(hours: Decimal, rate: Decimal) -> Option<Decimal> {
    hours.checked_mul(rate)
}

/// A lecturer's claim for hours worked
///
/// Hours, rate and total are private so the total can only ever be
/// `hours_worked * hourly_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Human-readable number, `PREFIX-YYYYMMDD-XXXXXXXX`
    pub claim_number: String,
    /// Owning lecturer
    pub lecturer_id: UserId,
    pub work_description: String,
    pub notes: Option<String>,
    hours_worked: Decimal,
    hourly_rate: Decimal,
    total_amount: Decimal,
    pub status: ClaimStatus,
    /// Comments from the last verify, return or approve
    pub reviewer_comments: Option<String>,
    pub rejection_reason: Option<String>,
    /// Coordinator who verified, returned or rejected the claim
    pub coordinator_id: Option<UserId>,
    /// Manager who approved or rejected the claim
    pub manager_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stamped by the most recent submit
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Stored claim fields, used by adapters to rebuild a `Claim`
///
/// There is no total here; it is recomputed on restore.
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub id: ClaimId,
    pub claim_number: String,
    pub lecturer_id: UserId,
    pub work_description: String,
    pub notes: Option<String>,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub status: ClaimStatus,
    pub reviewer_comments: Option<String>,
    pub rejection_reason: Option<String>,
    pub coordinator_id: Option<UserId>,
    pub manager_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Claim {
    /// Creates a new draft claim at the lecturer's current rate
    pub fn draft(
        lecturer_id: UserId,
        claim_number: String,
        request: ClaimRequest,
        hourly_rate: Decimal,
    ) -> Result<Self, ClaimError> {
        let now = Utc::now();
        let mut claim = Self {
            id: ClaimId::new_v7(),
            claim_number,
            lecturer_id,
            work_description: request.work_description,
            notes: request.notes,
            hours_worked: Decimal::ZERO,
            hourly_rate: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            status: ClaimStatus::Draft,
            reviewer_comments: None,
            rejection_reason: None,
            coordinator_id: None,
            manager_id: None,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        };
        claim.set_amounts(request.hours_worked, hourly_rate)?;
        Ok(claim)
    }

    /// Rebuilds a claim from storage, recomputing the total
    pub fn restore(record: ClaimRecord) -> Result<Self, ClaimError> {
        let mut claim = Self {
            id: record.id,
            claim_number: record.claim_number,
            lecturer_id: record.lecturer_id,
            work_description: record.work_description,
            notes: record.notes,
            hours_worked: Decimal::ZERO,
            hourly_rate: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            status: record.status,
            reviewer_comments: record.reviewer_comments,
            rejection_reason: record.rejection_reason,
            coordinator_id: record.coordinator_id,
            manager_id: record.manager_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            submitted_at: record.submitted_at,
        };
        claim.set_amounts(record.hours_worked, record.hourly_rate)?;
        Ok(claim)
    }

    pub fn hours_worked(&self) -> Decimal {
        self.hours_worked
    }

    pub fn hourly_rate(&self) -> Decimal {
        self.hourly_rate
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Returns true if `user` is the lecturer who owns this claim
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.lecturer_id == user
    }

    /// Replaces the lecturer's input and re-prices the claim at `hourly_rate`
    ///
    /// A returned claim goes back to draft and loses its reviewer comments.
    pub(crate) fn apply_edit(&mut self, request: ClaimRequest, hourly_rate: Decimal) -> Result<(), ClaimError> {
        self.set_amounts(request.hours_worked, hourly_rate)?;
        self.work_description = request.work_description;
        self.notes = request.notes;

        if self.status == ClaimStatus::Returned {
            self.status = ClaimStatus::Draft;
            self.reviewer_comments = None;
        }
        self.touch();
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn set_amounts(&mut self, hours: Decimal, rate: Decimal) -> Result<(), ClaimError> {
        let total = compute_total(hours, rate)
            .ok_or_else(|| ClaimError::validation("claim total is out of range"))?;
        self.hours_worked = hours;
        self.hourly_rate = rate;
        self.total_amount = total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(hours: Decimal) -> ClaimRequest {
        ClaimRequest {
            work_description: "INSY7315 lectures".to_string(),
            hours_worked: hours,
            notes: None,
        }
    }

    #[test]
    fn test_draft_total_is_hours_times_rate() {
        let claim = Claim::draft(UserId::new(), "CLM-20250301-AB12CD34".into(), request(dec!(10)), dec!(350))
            .unwrap();

        assert_eq!(claim.status, ClaimStatus::Draft);
        assert_eq!(claim.total_amount(), dec!(3500));
        assert!(claim.submitted_at.is_none());
    }

    #[test]
    fn test_fractional_hours_keep_precision() {
        let claim = Claim::draft(UserId::new(), "CLM-20250301-AB12CD34".into(), request(dec!(0.5)), dec!(333.33))
            .unwrap();
        assert_eq!(claim.total_amount(), dec!(166.665));
    }

    #[test]
    fn test_edit_of_returned_claim_goes_back_to_draft() {
        let mut claim = Claim::draft(UserId::new(), "CLM-20250301-AB12CD34".into(), request(dec!(10)), dec!(350))
            .unwrap();
        claim.status = ClaimStatus::Returned;
        claim.reviewer_comments = Some("fix hours".into());

        claim.apply_edit(request(dec!(8)), dec!(400)).unwrap();

        assert_eq!(claim.status, ClaimStatus::Draft);
        assert_eq!(claim.reviewer_comments, None);
        assert_eq!(claim.hourly_rate(), dec!(400));
        assert_eq!(claim.total_amount(), dec!(3200));
    }

    #[test]
    fn test_restore_recomputes_total() {
        let now = Utc::now();
        let claim = Claim::restore(ClaimRecord {
            id: ClaimId::new(),
            claim_number: "CLM-20250301-AB12CD34".into(),
            lecturer_id: UserId::new(),
            work_description: "Marking".into(),
            notes: None,
            hours_worked: dec!(4),
            hourly_rate: dec!(250.50),
            status: ClaimStatus::Submitted,
            reviewer_comments: None,
            rejection_reason: None,
            coordinator_id: None,
            manager_id: None,
            created_at: now,
            updated_at: now,
            submitted_at: Some(now),
        })
        .unwrap();

        assert_eq!(claim.total_amount(), dec!(1002.00));
    }

    #[test]
    fn test_transition_table() {
        use ClaimStatus::*;

        assert!(Draft.can_edit() && Returned.can_edit());
        assert!(!Submitted.can_edit() && !Verified.can_edit());
        assert!(Draft.can_submit() && Returned.can_submit());
        assert!(Submitted.can_verify() && !Verified.can_verify());
        assert!(Verified.can_approve() && !Submitted.can_approve());
        assert!(Submitted.can_return() && !Verified.can_return());
        assert!(Submitted.can_reject() && Verified.can_reject() && !Draft.can_reject());

        for status in [Approved, Rejected] {
            assert!(status.is_terminal());
            assert!(!status.can_edit() && !status.can_submit() && !status.can_verify());
            assert!(!status.can_approve() && !status.can_return() && !status.can_reject());
        }
    }

    #[test]
    fn test_status_parsing() {
        for status in ClaimStatus::ALL {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
        assert_eq!("Verified".parse::<ClaimStatus>().unwrap(), ClaimStatus::Verified);
        assert!("paid".parse::<ClaimStatus>().is_err());
    }
}
