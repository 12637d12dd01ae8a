//! Test Data Builders
//!
//! Builders let a test set only the fields it cares about. Unset names and
//! emails are generated with `fake`; emails carry a random suffix so they
//! never collide.

use fake::faker::internet::en::Username;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use uuid::Uuid;

use domain_claims::ClaimRequest;
use domain_users::{Role, User};

/// Builder for constructing test users
pub struct TestUserBuilder {
    full_name: Option<String>,
    email: Option<String>,
    role: Role,
    department: String,
    hourly_rate: Option<Decimal>,
    is_active: bool,
}

impl Default for TestUserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestUserBuilder {
    /// Creates a builder for an active coordinator
    pub fn new() -> Self {
        Self {
            full_name: None,
            email: None,
            role: Role::Coordinator,
            department: "Computer Science".to_string(),
            hourly_rate: None,
            is_active: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the hourly rate (only kept for lecturers by the admin service)
    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    /// Marks the user as deactivated
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> User {
        let full_name = self.full_name.unwrap_or_else(|| Name().fake());
        let email = self.email.unwrap_or_else(unique_email);

        let mut user = User::new(full_name, email, self.role, self.department);
        user.hourly_rate = self.hourly_rate;
        user.is_active = self.is_active;
        user
    }
}

fn unique_email() -> String {
    let local: String = Username().fake();
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}.{}@example.com",
        local.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), ""),
        &suffix[..8]
    )
}

/// Builder for claim requests
pub struct ClaimRequestBuilder {
    work_description: String,
    hours_worked: Decimal,
    notes: Option<String>,
}

impl Default for ClaimRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRequestBuilder {
    /// Ten hours of lecturing, no notes
    pub fn new() -> Self {
        Self {
            work_description: "PROG6212 lectures and tutorials".to_string(),
            hours_worked: Decimal::TEN,
            notes: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.work_description = description.into();
        self
    }

    pub fn with_hours(mut self, hours: Decimal) -> Self {
        self.hours_worked = hours;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> ClaimRequest {
        ClaimRequest {
            work_description: self.work_description,
            hours_worked: self.hours_worked,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_generated_emails_are_unique() {
        let a = TestUserBuilder::new().build();
        let b = TestUserBuilder::new().build();
        assert_ne!(a.email, b.email);
        assert!(a.email.ends_with("@example.com"));
    }

    #[test]
    fn test_builder_overrides() {
        let user = TestUserBuilder::new()
            .with_name("Aaron Abrahams")
            .with_role(Role::Lecturer)
            .with_rate(dec!(300))
            .inactive()
            .build();

        assert_eq!(user.full_name, "Aaron Abrahams");
        assert_eq!(user.hourly_rate, Some(dec!(300)));
        assert!(!user.is_active);
    }

    #[test]
    fn test_claim_request_defaults() {
        let request = ClaimRequestBuilder::new().with_notes("March").build();
        assert_eq!(request.hours_worked, dec!(10));
        assert_eq!(request.notes.as_deref(), Some("March"));
    }
}
