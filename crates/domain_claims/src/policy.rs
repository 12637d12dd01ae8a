//! Workflow policy
//!
//! Tunable limits for claim capture and document upload. Defaults match the
//! production deployment; every field can be overridden from the environment
//! with the `CLAIMS_` prefix, e.g. `CLAIMS_MAX_HOURS=160` or
//! `CLAIMS_ALLOWED_DOCUMENT_EXTENSIONS=.pdf,.docx`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::CoreError;

use crate::document::DocumentMetadata;

/// Limits applied by the claim workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowPolicy {
    /// Leading segment of generated claim numbers
    pub claim_number_prefix: String,
    /// Smallest claimable hours, inclusive
    pub min_hours: Decimal,
    /// Largest claimable hours, inclusive
    pub max_hours: Decimal,
    /// Submit fails with a validation error when no document is attached
    pub require_document_on_submit: bool,
    pub max_document_bytes: u64,
    /// Lower-case extensions including the dot
    pub allowed_document_extensions: Vec<String>,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            claim_number_prefix: "CLM".to_string(),
            min_hours: dec!(0.5),
            max_hours: dec!(180),
            require_document_on_submit: false,
            max_document_bytes: 5 * 1024 * 1024,
            allowed_document_extensions: vec![".pdf".into(), ".docx".into(), ".xlsx".into()],
        }
    }
}

impl WorkflowPolicy {
    /// Loads the policy from `CLAIMS_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, CoreError> {
        let policy: Self = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("CLAIMS")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_document_extensions"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))?;

        policy.validate()?;
        Ok(policy)
    }

    /// Checks the policy is internally consistent
    pub fn validate(&self) -> Result<(), CoreError> {
        let prefix_ok = !self.claim_number_prefix.is_empty()
            && self
                .claim_number_prefix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !prefix_ok {
            return Err(CoreError::configuration(
                "claim number prefix must be upper-case alphanumeric",
            ));
        }
        if self.min_hours <= Decimal::ZERO || self.max_hours < self.min_hours {
            return Err(CoreError::configuration(format!(
                "invalid hour bounds {}..={}",
                self.min_hours, self.max_hours
            )));
        }
        if self.max_document_bytes == 0 {
            return Err(CoreError::configuration("max document size must be positive"));
        }
        if self.allowed_document_extensions.iter().any(|e| !e.starts_with('.')) {
            return Err(CoreError::configuration("document extensions must start with '.'"));
        }
        Ok(())
    }

    pub fn hours_in_range(&self, hours: Decimal) -> bool {
        hours >= self.min_hours && hours <= self.max_hours
    }

    /// Returns a reason if the upload breaks the document rules
    pub fn document_violation(&self, metadata: &DocumentMetadata) -> Option<String> {
        if metadata.file_name.trim().is_empty() {
            return Some("file name is required".to_string());
        }

        let allowed = metadata.extension().is_some_and(|ext| {
            self.allowed_document_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        });
        if !allowed {
            return Some(format!(
                "only {} files are accepted",
                self.allowed_document_extensions.join(", ")
            ));
        }

        if metadata.size_bytes == 0 {
            return Some("file is empty".to_string());
        }
        if metadata.size_bytes > self.max_document_bytes {
            return Some(format!(
                "file exceeds the {} byte limit",
                self.max_document_bytes
            ));
        }
        None
    }
}
