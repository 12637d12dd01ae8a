//! Core Kernel - Foundational types shared by the claim workflow crates
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure crates:
//! - Strongly-typed identifiers for users, claims and documents
//! - The port error type and marker traits for the ports-and-adapters seams
//! - Common error types

pub mod identifiers;
pub mod ports;
pub mod error;

pub use identifiers::{UserId, ClaimId, DocumentId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
