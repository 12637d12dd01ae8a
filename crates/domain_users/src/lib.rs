//! User Directory Domain
//!
//! This crate owns the people who take part in the claim workflow and the two
//! facts the workflow needs about them: their role and, for lecturers, the
//! hourly rate HR has authorized.
//!
//! # Roles
//!
//! - **Lecturer**: captures and submits monthly claims, paid at an HR-set rate
//! - **Coordinator**: first-line reviewer (verify / return / reject)
//! - **Manager**: second-line reviewer (approve / reject)
//! - **HR**: administers user accounts and rates, runs reports
//!
//! The [`UserDirectory`] is the only place the workflow reads roles and rates
//! from; caller-supplied roles or rates are never trusted.

pub mod user;
pub mod error;
pub mod ports;
pub mod session;
pub mod directory;
pub mod admin;

pub use user::{User, Role, Actor, ActorProfile};
pub use error::UserError;
pub use ports::UserPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockUserPort;
pub use session::{SessionPort, StaticSession};
pub use directory::UserDirectory;
pub use admin::{UserAdministration, CreateUserRequest, UpdateUserRequest};
