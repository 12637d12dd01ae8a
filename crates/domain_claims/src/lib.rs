//! Lecturer Claims Domain
//!
//! This crate implements the monthly claim lifecycle: a lecturer captures the
//! hours they worked, a coordinator verifies or returns the claim, and a
//! manager approves or rejects it.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Submitted -> Verified -> Approved
//!   ^          |            |
//!   |          +-> Returned +-> Rejected
//!   |          |      |
//!   +----------+------+ (edit)   Submitted -> Rejected
//! ```
//!
//! `Approved` and `Rejected` are terminal. Only `Draft` and `Returned` claims
//! can be edited, and only by the lecturer who owns them. The total amount is
//! always hours worked times the lecturer's HR-authorized rate.

pub mod claim;
pub mod claim_number;
pub mod document;
pub mod policy;
pub mod ports;
pub mod workflow;
pub mod queries;
pub mod error;

pub use claim::{Claim, ClaimRecord, ClaimRequest, ClaimStatus, compute_total};
pub use claim_number::{generate_claim_number, is_well_formed_claim_number};
pub use document::{Document, DocumentMetadata};
pub use policy::WorkflowPolicy;
pub use ports::{ClaimPort, DocumentPort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockClaimPort, MockDocumentPort};
pub use workflow::{ClaimWorkflow, Operation};
pub use queries::{
    ClaimQueries, LecturerSummary, LecturerPerformance, HrDashboard, ApprovedClaimLine,
};
pub use error::ClaimError;
