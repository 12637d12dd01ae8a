//! Operator tooling for the claim workflow
//!
//! Loads [`AdminConfig`], prepares the database and seeds the default users.
//! The `claims-admin` binary wires these together.

pub mod config;
pub mod seed;

pub use config::AdminConfig;
pub use seed::{default_users, seed_users};
