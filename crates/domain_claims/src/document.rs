//! Supporting documents attached to a claim
//!
//! The core only keeps metadata and the already-encrypted payload it was
//! handed; encryption and file storage belong to the document adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DocumentId};

/// Metadata supplied with an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Original file name as uploaded
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl DocumentMetadata {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
        }
    }

    /// Lower-case extension including the dot, e.g. `.pdf`
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// A stored supporting document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub claim_id: ClaimId,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document record for `claim_id`
    pub fn new(claim_id: ClaimId, metadata: DocumentMetadata) -> Self {
        Self {
            id: DocumentId::new_v7(),
            claim_id,
            file_name: metadata.file_name,
            content_type: metadata.content_type,
            size_bytes: metadata.size_bytes,
            uploaded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let meta = DocumentMetadata::new("Timesheet.PDF", "application/pdf", 10);
        assert_eq!(meta.extension().as_deref(), Some(".pdf"));
    }

    #[test]
    fn test_extension_missing() {
        assert_eq!(DocumentMetadata::new("README", "text/plain", 1).extension(), None);
        assert_eq!(DocumentMetadata::new(".pdf", "application/pdf", 1).extension(), None);
        assert_eq!(DocumentMetadata::new("report.", "application/pdf", 1).extension(), None);
    }

    #[test]
    fn test_multi_dot_name_uses_last_extension() {
        let meta = DocumentMetadata::new("march.hours.xlsx", "application/vnd.ms-excel", 10);
        assert_eq!(meta.extension().as_deref(), Some(".xlsx"));
    }
}
