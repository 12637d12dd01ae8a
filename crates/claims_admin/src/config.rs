//! Operator configuration

use config::{Config, Environment};
use serde::Deserialize;

use core_kernel::CoreError;
use infra_db::DatabaseConfig;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/claims";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings for the `claims-admin` binary
///
/// Read from `ADMIN_*` variables. `DATABASE_URL` and `RUST_LOG` are used
/// when the prefixed variables are absent.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Log filter directive, e.g. `info` or `infra_db=debug`
    pub log_level: String,
    /// Insert the default users when they are missing
    pub seed_users: bool,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            seed_users: true,
            max_connections: 5,
            min_connections: 1,
        }
    }
}

impl AdminConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, CoreError> {
        Self::load(
            Environment::with_prefix("ADMIN").try_parsing(true),
            std::env::var("DATABASE_URL").ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }

    fn load(
        source: Environment,
        database_url: Option<String>,
        log_level: Option<String>,
    ) -> Result<Self, CoreError> {
        let defaults = Self::default();

        let config: Self = Config::builder()
            .set_default("database_url", database_url.unwrap_or(defaults.database_url))
            .and_then(|b| b.set_default("log_level", log_level.unwrap_or(defaults.log_level)))
            .and_then(|b| b.set_default("seed_users", defaults.seed_users))
            .and_then(|b| b.set_default("max_connections", i64::from(defaults.max_connections)))
            .and_then(|b| b.set_default("min_connections", i64::from(defaults.min_connections)))
            .and_then(|b| b.add_source(source).build())
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.database_url.trim().is_empty() {
            return Err(CoreError::configuration("database url is required"));
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(CoreError::configuration(format!(
                "invalid pool size: min {} max {}",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    /// Pool settings for `infra_db::create_pool`
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("ADMIN").try_parsing(true).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::load(env(&[]), None, None).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.log_level, "info");
        assert!(config.seed_users);
    }

    #[test]
    fn test_fallback_variables() {
        let config = AdminConfig::load(
            env(&[]),
            Some("postgres://db/claims".into()),
            Some("debug".into()),
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://db/claims");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_prefixed_variables_win() {
        let config = AdminConfig::load(
            env(&[
                ("ADMIN_DATABASE_URL", "postgres://admin/claims"),
                ("ADMIN_SEED_USERS", "false"),
                ("ADMIN_MAX_CONNECTIONS", "12"),
            ]),
            Some("postgres://db/claims".into()),
            None,
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://admin/claims");
        assert!(!config.seed_users);
        assert_eq!(config.database().max_connections, 12);
    }

    #[test]
    fn test_invalid_pool_size() {
        let result = AdminConfig::load(
            env(&[("ADMIN_MAX_CONNECTIONS", "1"), ("ADMIN_MIN_CONNECTIONS", "3")]),
            None,
            None,
        );
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }
}
