//! Test Utilities Crate
//!
//! Shared test infrastructure for the lecturer claims workspace.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built users, claim requests and documents
//! - `builders`: Builder patterns for test data construction
//! - `harness`: The workflow wired to in-memory ports
//! - `database`: PostgreSQL test containers
//! - `assertions`: Assertion helpers for claims
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
