//! Read models
//!
//! Dashboards, review queues and HR reporting. Every query resolves the
//! actor's role from the user store first, like the workflow does.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use core_kernel::UserId;
use domain_users::{Role, User, UserDirectory, UserPort};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::ports::ClaimPort;

/// Lecturer dashboard counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LecturerSummary {
    pub total_claims: usize,
    pub approved_claims: usize,
    /// Submitted or verified
    pub pending_claims: usize,
    pub approved_amount: Decimal,
}

/// HR dashboard counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrDashboard {
    pub total_users: usize,
    pub total_lecturers: usize,
    pub total_claims: usize,
    pub approved_claims: usize,
}

/// Per-lecturer statistics for HR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LecturerPerformance {
    pub lecturer_id: UserId,
    pub full_name: String,
    pub department: String,
    pub total_claims: usize,
    pub approved_claims: usize,
    pub rejected_claims: usize,
    pub approved_amount: Decimal,
    pub average_hours: Decimal,
    /// Approved as a percentage of all claims, two decimal places
    pub success_rate: Decimal,
}

/// One row of the approved-claims report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedClaimLine {
    pub claim_number: String,
    pub lecturer_name: String,
    pub lecturer_email: String,
    pub department: String,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub total_amount: Decimal,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: DateTime<Utc>,
    /// Approving manager's name, if they still exist
    pub approved_by: Option<String>,
}

/// Role-gated claim queries
#[derive(Clone)]
pub struct ClaimQueries {
    claims: Arc<dyn ClaimPort>,
    users: Arc<dyn UserPort>,
    directory: UserDirectory,
}

impl ClaimQueries {
    pub fn new(claims: Arc<dyn ClaimPort>, users: Arc<dyn UserPort>) -> Self {
        Self {
            claims,
            directory: UserDirectory::new(users.clone()),
            users,
        }
    }

    /// The actor's own claims, newest first
    pub async fn claims_for_lecturer(&self, actor: UserId) -> Result<Vec<Claim>, ClaimError> {
        self.directory.require_role(actor, &[Role::Lecturer]).await?;
        Ok(self.claims.list_by_user(actor).await?)
    }

    /// The actor's `count` most recent claims
    pub async fn recent_claims(&self, actor: UserId, count: usize) -> Result<Vec<Claim>, ClaimError> {
        let mut claims = self.claims_for_lecturer(actor).await?;
        claims.truncate(count);
        Ok(claims)
    }

    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn lecturer_summary(&self, actor: UserId) -> Result<LecturerSummary, ClaimError> {
        let claims = self.claims_for_lecturer(actor).await?;

        let approved: Vec<&Claim> = claims
            .iter()
            .filter(|c| c.status == ClaimStatus::Approved)
            .collect();

        Ok(LecturerSummary {
            total_claims: claims.len(),
            approved_claims: approved.len(),
            pending_claims: claims.iter().filter(|c| c.status.is_pending()).count(),
            approved_amount: approved.iter().map(|c| c.total_amount()).sum(),
        })
    }

    /// Submitted claims waiting for a coordinator, oldest first
    pub async fn coordinator_queue(&self, actor: UserId) -> Result<Vec<Claim>, ClaimError> {
        self.directory.require_role(actor, &[Role::Coordinator]).await?;
        Ok(self.claims.list_by_status(ClaimStatus::Submitted).await?)
    }

    /// Verified claims waiting for a manager, oldest first
    pub async fn manager_queue(&self, actor: UserId) -> Result<Vec<Claim>, ClaimError> {
        self.directory.require_role(actor, &[Role::Manager]).await?;
        Ok(self.claims.list_by_status(ClaimStatus::Verified).await?)
    }

    /// Every claim, newest first
    pub async fn all_claims(&self, actor: UserId) -> Result<Vec<Claim>, ClaimError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;
        Ok(self.claims.list_all().await?)
    }

    /// Approved claims joined with lecturer details, for payroll export
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn approved_claims_report(&self, actor: UserId) -> Result<Vec<ApprovedClaimLine>, ClaimError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        let users = self.users_by_id().await?;
        let claims = self.claims.list_by_status(ClaimStatus::Approved).await?;

        let lines = claims
            .iter()
            .map(|claim| {
                let lecturer = users.get(&claim.lecturer_id);
                ApprovedClaimLine {
                    claim_number: claim.claim_number.clone(),
                    lecturer_name: lecturer.map(|u| u.full_name.clone()).unwrap_or_default(),
                    lecturer_email: lecturer.map(|u| u.email.clone()).unwrap_or_default(),
                    department: lecturer.map(|u| u.department.clone()).unwrap_or_default(),
                    hours_worked: claim.hours_worked(),
                    hourly_rate: claim.hourly_rate(),
                    total_amount: claim.total_amount(),
                    submitted_at: claim.submitted_at,
                    approved_at: claim.updated_at,
                    approved_by: claim
                        .manager_id
                        .and_then(|id| users.get(&id))
                        .map(|u| u.full_name.clone()),
                }
            })
            .collect();
        Ok(lines)
    }

    /// Statistics for every active lecturer, ordered by name
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn lecturer_performance(&self, actor: UserId) -> Result<Vec<LecturerPerformance>, ClaimError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        let mut lecturers: Vec<User> = self
            .users
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role == Role::Lecturer && u.is_active)
            .collect();
        lecturers.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        let mut by_lecturer: HashMap<UserId, Vec<Claim>> = HashMap::new();
        for claim in self.claims.list_all().await? {
            by_lecturer.entry(claim.lecturer_id).or_default().push(claim);
        }

        Ok(lecturers
            .into_iter()
            .map(|lecturer| {
                let claims = by_lecturer.remove(&lecturer.id).unwrap_or_default();
                performance_of(lecturer, &claims)
            })
            .collect())
    }

    pub async fn hr_dashboard(&self, actor: UserId) -> Result<HrDashboard, ClaimError> {
        self.directory.require_role(actor, &[Role::Hr]).await?;

        let users = self.users.list_users().await?;
        let claims = self.claims.list_all().await?;

        Ok(HrDashboard {
            total_users: users.len(),
            total_lecturers: users.iter().filter(|u| u.role == Role::Lecturer).count(),
            total_claims: claims.len(),
            approved_claims: claims
                .iter()
                .filter(|c| c.status == ClaimStatus::Approved)
                .count(),
        })
    }

    async fn users_by_id(&self) -> Result<HashMap<UserId, User>, ClaimError> {
        Ok(self
            .users
            .list_users()
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }
}

fn performance_of(lecturer: User, claims: &[Claim]) -> LecturerPerformance {
    let total = claims.len();
    let approved: Vec<&Claim> = claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Approved)
        .collect();
    let rejected = claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Rejected)
        .count();

    let (average_hours, success_rate) = if total == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let hours: Decimal = claims.iter().map(|c| c.hours_worked()).sum();
        let count = Decimal::from(total);
        (
            (hours / count).round_dp(2),
            (Decimal::from(approved.len()) / count * dec!(100)).round_dp(2),
        )
    };

    LecturerPerformance {
        lecturer_id: lecturer.id,
        full_name: lecturer.full_name,
        department: lecturer.department,
        total_claims: total,
        approved_claims: approved.len(),
        rejected_claims: rejected,
        approved_amount: approved.iter().map(|c| c.total_amount()).sum(),
        average_hours,
        success_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::ClaimRequest;

    fn claim(lecturer: UserId, hours: Decimal, status: ClaimStatus) -> Claim {
        let request = ClaimRequest {
            work_description: "Lectures".into(),
            hours_worked: hours,
            notes: None,
        };
        let number = crate::claim_number::generate_claim_number("CLM", Utc::now().date_naive());
        let mut claim = Claim::draft(lecturer, number, request, dec!(100)).unwrap();
        claim.status = status;
        claim
    }

    #[test]
    fn test_performance_of_lecturer() {
        let lecturer = User::lecturer("Chuma Makhathini", "chuma@example.com", "CS", dec!(100));
        let claims = vec![
            claim(lecturer.id, dec!(10), ClaimStatus::Approved),
            claim(lecturer.id, dec!(5), ClaimStatus::Rejected),
            claim(lecturer.id, dec!(6), ClaimStatus::Submitted),
        ];

        let perf = performance_of(lecturer, &claims);
        assert_eq!(perf.total_claims, 3);
        assert_eq!(perf.approved_claims, 1);
        assert_eq!(perf.rejected_claims, 1);
        assert_eq!(perf.approved_amount, dec!(1000));
        assert_eq!(perf.average_hours, dec!(7));
        assert_eq!(perf.success_rate, dec!(33.33));
    }

    #[test]
    fn test_performance_without_claims() {
        let lecturer = User::lecturer("Chuma Makhathini", "chuma@example.com", "CS", dec!(100));
        let perf = performance_of(lecturer, &[]);
        assert_eq!(perf.average_hours, Decimal::ZERO);
        assert_eq!(perf.success_rate, Decimal::ZERO);
    }
}
