//! Claims Admin Binary
//!
//! Prepares a database for the claim workflow: applies the migrations, seeds
//! the default users and reports adapter health.
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/claims cargo run --bin claims-admin
//! ```
//!
//! # Environment Variables
//!
//! * `ADMIN_DATABASE_URL` - PostgreSQL connection string (falls back to `DATABASE_URL`)
//! * `ADMIN_LOG_LEVEL` - Log filter (falls back to `RUST_LOG`, default: info)
//! * `ADMIN_SEED_USERS` - Seed the default users (default: true)
//! * `ADMIN_MAX_CONNECTIONS` / `ADMIN_MIN_CONNECTIONS` - Pool sizing
//! * `CLAIMS_*` - Workflow policy, validated at startup

use anyhow::Context;
use claims_admin::{default_users, seed_users, AdminConfig};
use core_kernel::{AdapterHealth, HealthCheckable};
use domain_claims::WorkflowPolicy;
use infra_db::{create_pool, migrate, PostgresClaimAdapter, PostgresDocumentAdapter, PostgresUserAdapter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AdminConfig::from_env().context("loading admin configuration")?;
    init_tracing(&config.log_level);

    let policy = WorkflowPolicy::from_env().context("loading workflow policy")?;
    tracing::info!(
        prefix = %policy.claim_number_prefix,
        require_document = policy.require_document_on_submit,
        "Workflow policy loaded"
    );

    let pool = create_pool(config.database())
        .await
        .context("connecting to database")?;
    migrate(&pool).await.context("running migrations")?;

    if config.seed_users {
        let users = PostgresUserAdapter::new(pool.clone());
        let inserted = seed_users(&users, default_users())
            .await
            .context("seeding default users")?;
        tracing::info!(inserted, "Default users checked");
    }

    let adapters: Vec<Box<dyn HealthCheckable>> = vec![
        Box::new(PostgresUserAdapter::new(pool.clone())),
        Box::new(PostgresClaimAdapter::new(pool.clone())),
        Box::new(PostgresDocumentAdapter::new(pool.clone())),
    ];
    let mut healthy = true;
    for adapter in &adapters {
        let result = adapter.health_check().await;
        tracing::info!(
            adapter = %result.adapter_id,
            status = ?result.status,
            latency_ms = result.latency_ms,
            "Health check"
        );
        healthy &= result.status == AdapterHealth::Healthy;
    }

    pool.close().await;
    anyhow::ensure!(healthy, "one or more adapters are unhealthy");
    tracing::info!("Database ready");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
