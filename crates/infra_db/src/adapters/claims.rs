//! PostgreSQL Claim Adapter
//!
//! Status transitions are written with a conditional update:
//!
//! ```sql
//! UPDATE claims SET ... WHERE claim_id = $1 AND status = $expected
//! ```
//!
//! If another reviewer moved the claim first, no row matches and the adapter
//! reports `PortError::Conflict` without touching the stored claim.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_claims::{Claim, ClaimPort, ClaimRecord, ClaimStatus};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "claim_id, claim_number, lecturer_id, work_description, notes, \
                             hours_worked, hourly_rate, status, reviewer_comments, \
                             rejection_reason, coordinator_id, manager_id, created_at, \
                             updated_at, submitted_at";

/// Database row for the `claims` table
///
/// `total_amount` is not read back; the domain recomputes it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub claim_number: String,
    pub lecturer_id: Uuid,
    pub work_description: String,
    pub notes: Option<String>,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub status: String,
    pub reviewer_comments: Option<String>,
    pub rejection_reason: Option<String>,
    pub coordinator_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let status: ClaimStatus = row.status.parse().map_err(DatabaseError::CorruptRow)?;

        Claim::restore(ClaimRecord {
            id: ClaimId::from_uuid(row.claim_id),
            claim_number: row.claim_number,
            lecturer_id: UserId::from_uuid(row.lecturer_id),
            work_description: row.work_description,
            notes: row.notes,
            hours_worked: row.hours_worked,
            hourly_rate: row.hourly_rate,
            status,
            reviewer_comments: row.reviewer_comments,
            rejection_reason: row.rejection_reason,
            coordinator_id: row.coordinator_id.map(UserId::from_uuid),
            manager_id: row.manager_id.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
            submitted_at: row.submitted_at,
        })
        .map_err(|e| DatabaseError::CorruptRow(e.to_string()))
    }
}

/// PostgreSQL-backed implementation of the ClaimPort trait
#[derive(Debug, Clone)]
pub struct PostgresClaimAdapter {
    pool: PgPool,
}

impl PostgresClaimAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_claims(rows: Vec<ClaimRow>) -> Result<Vec<Claim>, PortError> {
    rows.into_iter()
        .map(|row| Claim::try_from(row).map_err(PortError::from))
        .collect()
}

impl DomainPort for PostgresClaimAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClaimAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-claim-adapter").await
    }
}

#[async_trait]
impl ClaimPort for PostgresClaimAdapter {
    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        debug!("Fetching claim by ID");

        let sql = format!("SELECT {} FROM claims WHERE claim_id = $1", CLAIM_COLUMNS);
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("Claim", id))?;

        Ok(Claim::try_from(row)?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, claim_number = %claim.claim_number))]
    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
        debug!("Inserting claim");

        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id, claim_number, lecturer_id, work_description, notes,
                hours_worked, hourly_rate, total_amount, status,
                reviewer_comments, rejection_reason, coordinator_id, manager_id,
                created_at, updated_at, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(&claim.claim_number)
        .bind(*claim.lecturer_id.as_uuid())
        .bind(&claim.work_description)
        .bind(&claim.notes)
        .bind(claim.hours_worked())
        .bind(claim.hourly_rate())
        .bind(claim.total_amount())
        .bind(claim.status.as_str())
        .bind(&claim.reviewer_comments)
        .bind(&claim.rejection_reason)
        .bind(claim.coordinator_id.map(Uuid::from))
        .bind(claim.manager_id.map(Uuid::from))
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .bind(claim.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, expected = %expected, status = %claim.status))]
    async fn update_claim(&self, claim: &Claim, expected: ClaimStatus) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET work_description = $3, notes = $4, hours_worked = $5, hourly_rate = $6,
                total_amount = $7, status = $8, reviewer_comments = $9,
                rejection_reason = $10, coordinator_id = $11, manager_id = $12,
                updated_at = $13, submitted_at = $14
            WHERE claim_id = $1 AND status = $2
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(expected.as_str())
        .bind(&claim.work_description)
        .bind(&claim.notes)
        .bind(claim.hours_worked())
        .bind(claim.hourly_rate())
        .bind(claim.total_amount())
        .bind(claim.status.as_str())
        .bind(&claim.reviewer_comments)
        .bind(&claim.rejection_reason)
        .bind(claim.coordinator_id.map(Uuid::from))
        .bind(claim.manager_id.map(Uuid::from))
        .bind(claim.updated_at)
        .bind(claim.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: either the claim is gone or its status moved on.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM claims WHERE claim_id = $1)")
            .bind(*claim.id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if exists {
            debug!("Conditional update lost");
            Err(DatabaseError::StaleWrite(format!("claim {} is no longer {}", claim.id, expected)).into())
        } else {
            Err(DatabaseError::not_found("Claim", claim.id).into())
        }
    }

    async fn list_by_user(&self, lecturer_id: UserId) -> Result<Vec<Claim>, PortError> {
        let sql = format!(
            "SELECT {} FROM claims WHERE lecturer_id = $1 ORDER BY created_at DESC",
            CLAIM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(*lecturer_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        into_claims(rows)
    }

    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError> {
        let sql = format!(
            "SELECT {} FROM claims WHERE status = $1 \
             ORDER BY submitted_at ASC NULLS LAST, created_at ASC",
            CLAIM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        into_claims(rows)
    }

    async fn list_all(&self) -> Result<Vec<Claim>, PortError> {
        let sql = format!("SELECT {} FROM claims ORDER BY created_at DESC", CLAIM_COLUMNS);
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        into_claims(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(status: &str) -> ClaimRow {
        let now = Utc::now();
        ClaimRow {
            claim_id: Uuid::new_v4(),
            claim_number: "CLM-20250301-AB12CD34".into(),
            lecturer_id: Uuid::new_v4(),
            work_description: "PROG6212 lectures".into(),
            notes: None,
            hours_worked: dec!(12.50),
            hourly_rate: dec!(350.00),
            status: status.into(),
            reviewer_comments: None,
            rejection_reason: None,
            coordinator_id: Some(Uuid::new_v4()),
            manager_id: None,
            created_at: now,
            updated_at: now,
            submitted_at: Some(now),
        }
    }

    #[test]
    fn test_row_to_claim_recomputes_total() {
        let claim = Claim::try_from(row("verified")).unwrap();
        assert_eq!(claim.status, ClaimStatus::Verified);
        assert_eq!(claim.total_amount(), dec!(4375));
        assert!(claim.coordinator_id.is_some());
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let result = Claim::try_from(row("paid"));
        assert!(matches!(result, Err(DatabaseError::CorruptRow(_))));
    }
}
