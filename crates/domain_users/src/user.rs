//! User aggregate and roles

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::UserId;

/// Role of a user in the claim workflow
///
/// The declaration order is the display order used by HR user listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Submits claims for hours worked
    Lecturer,
    /// First-line reviewer
    Coordinator,
    /// Second-line reviewer
    Manager,
    /// Administers users and rates
    #[serde(rename = "HR")]
    Hr,
}

impl Role {
    /// Returns the storage code for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lecturer => "lecturer",
            Role::Coordinator => "coordinator",
            Role::Manager => "manager",
            Role::Hr => "hr",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Lecturer => "Lecturer",
            Role::Coordinator => "Coordinator",
            Role::Manager => "Manager",
            Role::Hr => "HR",
        };
        f.write_str(label)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lecturer" => Ok(Role::Lecturer),
            "coordinator" => Ok(Role::Coordinator),
            "manager" => Ok(Role::Manager),
            "hr" => Ok(Role::Hr),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A person known to the claim system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Full display name
    pub full_name: String,
    /// Login email, stored lower-case
    pub email: String,
    /// Workflow role
    pub role: Role,
    /// Department or faculty
    pub department: String,
    /// Hourly rate, only meaningful for lecturers
    pub hourly_rate: Option<Decimal>,
    /// Deactivated users keep their history but cannot act
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates an active user without an hourly rate
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        department: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new_v7(),
            full_name: full_name.into(),
            email: email.into().to_lowercase(),
            role,
            department: department.into(),
            hourly_rate: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an active lecturer paid at `hourly_rate`
    pub fn lecturer(
        full_name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        hourly_rate: Decimal,
    ) -> Self {
        let mut user = Self::new(full_name, email, Role::Lecturer, department);
        user.hourly_rate = Some(hourly_rate);
        user
    }

    /// Upper-case initials of each word in the full name
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// The rate the workflow may use in money calculations
    ///
    /// Only lecturers carry a usable rate; a stored value on any other role
    /// is ignored, as is a zero or negative rate.
    pub fn effective_hourly_rate(&self) -> Option<Decimal> {
        match self.role {
            Role::Lecturer => self.hourly_rate.filter(|rate| *rate > Decimal::ZERO),
            _ => None,
        }
    }

    /// Returns the directory view of this user
    pub fn profile(&self) -> ActorProfile {
        ActorProfile {
            user_id: self.id,
            role: self.role,
            is_active: self.is_active,
            hourly_rate: self.effective_hourly_rate(),
        }
    }
}

/// The signed-in user as reported by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

/// Role and rate facts resolved from the user store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub user_id: UserId,
    pub role: Role,
    pub is_active: bool,
    /// Present only for lecturers with a positive rate
    pub hourly_rate: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_initials() {
        let user = User::new("Chuma Makhathini", "c@example.com", Role::Lecturer, "CS");
        assert_eq!(user.initials(), "CM");
    }

    #[test]
    fn test_email_is_lowercased() {
        let user = User::new("Muzi Sithole", "Muzi.Sithole@Example.com", Role::Coordinator, "CS");
        assert_eq!(user.email, "muzi.sithole@example.com");
    }

    #[test]
    fn test_effective_rate_ignored_for_reviewers() {
        let mut manager = User::new("Ouma Stella", "o@example.com", Role::Manager, "IT");
        manager.hourly_rate = Some(dec!(500));
        assert_eq!(manager.effective_hourly_rate(), None);
        assert_eq!(manager.profile().hourly_rate, None);
    }

    #[test]
    fn test_effective_rate_requires_positive_value() {
        let lecturer = User::lecturer("A B", "a@example.com", "CS", dec!(0));
        assert_eq!(lecturer.effective_hourly_rate(), None);

        let lecturer = User::lecturer("A B", "a@example.com", "CS", dec!(350));
        assert_eq!(lecturer.effective_hourly_rate(), Some(dec!(350)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert_eq!(Role::Coordinator.as_str().parse::<Role>().unwrap(), Role::Coordinator);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_ordering_matches_listing_order() {
        let mut roles = vec![Role::Hr, Role::Manager, Role::Lecturer, Role::Coordinator];
        roles.sort();
        assert_eq!(roles, vec![Role::Lecturer, Role::Coordinator, Role::Manager, Role::Hr]);
    }
}
