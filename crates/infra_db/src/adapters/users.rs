//! PostgreSQL User Adapter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_users::{Role, User, UserPort};

use crate::error::DatabaseError;

const USER_COLUMNS: &str = "user_id, full_name, email, role, department, hourly_rate, \
                            is_active, created_at, updated_at";

/// Database row for the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DatabaseError::CorruptRow)?;
        Ok(User {
            id: UserId::from_uuid(row.user_id),
            full_name: row.full_name,
            email: row.email,
            role,
            department: row.department,
            hourly_rate: row.hourly_rate,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed implementation of the UserPort trait
///
/// Email uniqueness is enforced by the `users_email_key` index on
/// `LOWER(email)`; a violation surfaces as `PortError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresUserAdapter {
    pool: PgPool,
}

impl PostgresUserAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresUserAdapter {}

#[async_trait]
impl HealthCheckable for PostgresUserAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-user-adapter").await
    }
}

#[async_trait]
impl UserPort for PostgresUserAdapter {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        debug!("Fetching user by ID");

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("User", id))?;

        Ok(User::try_from(row)?)
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY full_name",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| User::try_from(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User) -> Result<(), PortError> {
        debug!("Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, full_name, email, role, department, hourly_rate,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.hourly_rate)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: &User) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, role = $4, department = $5,
                hourly_rate = $6, is_active = $7, updated_at = $8
            WHERE user_id = $1
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.hourly_rate)
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("User", user.id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(role: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            user_id: Uuid::new_v4(),
            full_name: "Chuma Makhathini".into(),
            email: "chuma@example.com".into(),
            role: role.into(),
            department: "Computer Science".into(),
            hourly_rate: Some(dec!(350.00)),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_to_user() {
        let user = User::try_from(row("lecturer")).unwrap();
        assert_eq!(user.role, Role::Lecturer);
        assert_eq!(user.effective_hourly_rate(), Some(dec!(350)));
    }

    #[test]
    fn test_unknown_role_is_corrupt() {
        let result = User::try_from(row("dean"));
        assert!(matches!(result, Err(DatabaseError::CorruptRow(_))));
    }
}
