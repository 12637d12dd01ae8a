//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the user, claim and document ports, built
//! on SQLx.
//!
//! Queries are checked at runtime (`sqlx::query_as::<_, Row>`) so the crate
//! builds without a live database. Claim transitions are written with a
//! conditional `UPDATE ... WHERE status = $expected`; an update that matches
//! no row is reported as a conflict, which the workflow turns into an
//! invalid transition.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, migrate};
//! use infra_db::adapters::{PostgresClaimAdapter, PostgresDocumentAdapter, PostgresUserAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! migrate(&pool).await?;
//! let users = Arc::new(PostgresUserAdapter::new(pool.clone()));
//! ```

pub mod pool;
pub mod error;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, create_pool_from_url, migrate};
pub use error::DatabaseError;
pub use adapters::{PostgresClaimAdapter, PostgresDocumentAdapter, PostgresUserAdapter};
