//! Pre-built Test Fixtures
//!
//! Ready-to-use users, claim requests and documents. Each call creates a
//! fresh user id; emails are fixed per fixture so tests can look them up.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_claims::{ClaimRequest, DocumentMetadata};
use domain_users::{Role, User};

/// Fixture for user test data
pub struct UserFixtures;

impl UserFixtures {
    /// Standard lecturer rate used across the suite
    pub const LECTURER_RATE: Decimal = dec!(350);

    /// Lecturer paid R350/hour
    pub fn lecturer() -> User {
        User::lecturer(
            "Chuma Makhathini",
            "chuma.makhathini@example.com",
            "Computer Science",
            Self::LECTURER_RATE,
        )
    }

    /// A second lecturer, for ownership tests
    pub fn another_lecturer() -> User {
        User::lecturer("Thandi Nkosi", "thandi.nkosi@example.com", "Information Systems", dec!(420))
    }

    /// Lecturer whose rate HR never set
    pub fn lecturer_without_rate() -> User {
        let mut user = User::new("Lerato Dube", "lerato.dube@example.com", Role::Lecturer, "Mathematics");
        user.hourly_rate = None;
        user
    }

    pub fn coordinator() -> User {
        User::new("Muzi Sithole", "muzi.sithole@example.com", Role::Coordinator, "Head of Computer Science")
    }

    pub fn manager() -> User {
        User::new("Ouma Stella", "ouma.stella@example.com", Role::Manager, "Head of School of IT")
    }

    pub fn hr() -> User {
        User::new("Kekeletso Mokete", "hr@example.com", Role::Hr, "Human Resources")
    }
}

/// Fixture for claim input
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Ten hours of lecturing
    pub fn ten_hours() -> ClaimRequest {
        Self::hours(dec!(10))
    }

    pub fn hours(hours: Decimal) -> ClaimRequest {
        ClaimRequest {
            work_description: "PROG6212 lectures and tutorials".to_string(),
            hours_worked: hours,
            notes: None,
        }
    }
}

/// Fixture for document uploads
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A 2 KiB timesheet PDF
    pub fn timesheet_pdf() -> DocumentMetadata {
        DocumentMetadata::new("march-timesheet.pdf", "application/pdf", 2048)
    }

    pub fn with_name(file_name: &str, size_bytes: u64) -> DocumentMetadata {
        DocumentMetadata::new(file_name, "application/octet-stream", size_bytes)
    }

    /// Stand-in for an encrypted payload
    pub fn encrypted_payload() -> Vec<u8> {
        vec![0x5A; 64]
    }
}
