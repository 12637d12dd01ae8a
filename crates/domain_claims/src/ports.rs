//! Claims Domain Ports
//!
//! Storage seams for the claim workflow. Adapters:
//!
//! - **PostgreSQL adapters**: `infra_db::adapters::{PostgresClaimAdapter, PostgresDocumentAdapter}`
//! - **Mock adapters**: in-memory maps for tests and local development
//!
//! ```rust,ignore
//! let claims: Arc<dyn ClaimPort> = Arc::new(PostgresClaimAdapter::new(pool.clone()));
//! let documents: Arc<dyn DocumentPort> = Arc::new(PostgresDocumentAdapter::new(pool));
//! let workflow = ClaimWorkflow::new(claims, documents, users, WorkflowPolicy::default());
//! ```

use async_trait::async_trait;

use core_kernel::{ClaimId, DocumentId, UserId, PortError, DomainPort, HealthCheckable};

use crate::claim::{Claim, ClaimStatus};
use crate::document::{Document, DocumentMetadata};

/// The claim store
#[async_trait]
pub trait ClaimPort: DomainPort + HealthCheckable {
    /// Retrieves a claim by ID, or `PortError::NotFound`
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Stores a new claim
    ///
    /// Fails with `PortError::Conflict` if the claim number is taken.
    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError>;

    /// Replaces a claim only if its stored status is still `expected`
    ///
    /// Fails with `PortError::Conflict` when another writer changed the
    /// status first; the stored claim is then left untouched.
    async fn update_claim(&self, claim: &Claim, expected: ClaimStatus) -> Result<(), PortError>;

    /// Claims owned by a lecturer, newest first
    async fn list_by_user(&self, lecturer_id: UserId) -> Result<Vec<Claim>, PortError>;

    /// Claims in a status, oldest submission first
    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError>;

    /// Every claim, newest first
    async fn list_all(&self) -> Result<Vec<Claim>, PortError>;
}

/// The supporting document store
///
/// Payloads arrive already encrypted by the upload adapter and are stored
/// opaquely.
#[async_trait]
pub trait DocumentPort: DomainPort + HealthCheckable {
    async fn count_for_claim(&self, claim_id: ClaimId) -> Result<u64, PortError>;

    /// Stores a document and returns its record
    async fn attach(
        &self,
        claim_id: ClaimId,
        metadata: DocumentMetadata,
        encrypted: Vec<u8>,
    ) -> Result<Document, PortError>;

    /// Documents of a claim, oldest upload first
    async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Document>, PortError>;

    /// A document with its encrypted payload
    async fn get_document(&self, id: DocumentId) -> Result<(Document, Vec<u8>), PortError>;
}

/// Sorts newest first by creation time
pub(crate) fn newest_first(claims: &mut [Claim]) {
    claims.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Sorts by submission time, unsubmitted claims last
pub(crate) fn oldest_submission_first(claims: &mut [Claim]) {
    claims.sort_by(|a, b| {
        (a.submitted_at.is_none(), a.submitted_at, a.created_at)
            .cmp(&(b.submitted_at.is_none(), b.submitted_at, b.created_at))
    });
}

/// Mock implementations of the claim ports for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of ClaimPort
    ///
    /// The compare-and-set in `update_claim` runs under the write lock, so
    /// concurrent transitions on one claim serialize exactly like the
    /// conditional `UPDATE` of the Postgres adapter.
    #[derive(Debug, Default, Clone)]
    pub struct MockClaimPort {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
    }

    impl MockClaimPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let port = Self::new();
            {
                let mut map = port.claims.write().await;
                for claim in claims {
                    map.insert(claim.id, claim);
                }
            }
            port
        }

        /// Number of stored claims
        pub async fn len(&self) -> usize {
            self.claims.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.claims.read().await.is_empty()
        }
    }

    impl DomainPort for MockClaimPort {}

    #[async_trait]
    impl HealthCheckable for MockClaimPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-claim-port")
        }
    }

    #[async_trait]
    impl ClaimPort for MockClaimPort {
        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.values().any(|c| c.claim_number == claim.claim_number) {
                return Err(PortError::conflict(format!(
                    "claim number {} already exists",
                    claim.claim_number
                )));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn update_claim(&self, claim: &Claim, expected: ClaimStatus) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            let slot = claims
                .get_mut(&claim.id)
                .ok_or_else(|| PortError::not_found("Claim", claim.id))?;

            if slot.status != expected {
                return Err(PortError::conflict(format!(
                    "claim {} is {}, expected {}",
                    claim.id, slot.status, expected
                )));
            }
            *slot = claim.clone();
            Ok(())
        }

        async fn list_by_user(&self, lecturer_id: UserId) -> Result<Vec<Claim>, PortError> {
            let mut claims: Vec<Claim> = self
                .claims
                .read()
                .await
                .values()
                .filter(|c| c.lecturer_id == lecturer_id)
                .cloned()
                .collect();
            newest_first(&mut claims);
            Ok(claims)
        }

        async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError> {
            let mut claims: Vec<Claim> = self
                .claims
                .read()
                .await
                .values()
                .filter(|c| c.status == status)
                .cloned()
                .collect();
            oldest_submission_first(&mut claims);
            Ok(claims)
        }

        async fn list_all(&self) -> Result<Vec<Claim>, PortError> {
            let mut claims: Vec<Claim> = self.claims.read().await.values().cloned().collect();
            newest_first(&mut claims);
            Ok(claims)
        }
    }

    /// In-memory mock implementation of DocumentPort
    #[derive(Debug, Default, Clone)]
    pub struct MockDocumentPort {
        documents: Arc<RwLock<Vec<(Document, Vec<u8>)>>>,
    }

    impl MockDocumentPort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockDocumentPort {}

    #[async_trait]
    impl HealthCheckable for MockDocumentPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-document-port")
        }
    }

    #[async_trait]
    impl DocumentPort for MockDocumentPort {
        async fn count_for_claim(&self, claim_id: ClaimId) -> Result<u64, PortError> {
            let count = self
                .documents
                .read()
                .await
                .iter()
                .filter(|(doc, _)| doc.claim_id == claim_id)
                .count();
            Ok(count as u64)
        }

        async fn attach(
            &self,
            claim_id: ClaimId,
            metadata: DocumentMetadata,
            encrypted: Vec<u8>,
        ) -> Result<Document, PortError> {
            let document = Document::new(claim_id, metadata);
            self.documents.write().await.push((document.clone(), encrypted));
            Ok(document)
        }

        async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Document>, PortError> {
            Ok(self
                .documents
                .read()
                .await
                .iter()
                .filter(|(doc, _)| doc.claim_id == claim_id)
                .map(|(doc, _)| doc.clone())
                .collect())
        }

        async fn get_document(&self, id: DocumentId) -> Result<(Document, Vec<u8>), PortError> {
            self.documents
                .read()
                .await
                .iter()
                .find(|(doc, _)| doc.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Document", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockClaimPort, MockDocumentPort};
    use super::*;
    use crate::claim::ClaimRequest;
    use rust_decimal_macros::dec;

    fn claim_for(lecturer: UserId, number: &str) -> Claim {
        let request = ClaimRequest {
            work_description: "Tutorials".into(),
            hours_worked: dec!(6),
            notes: None,
        };
        Claim::draft(lecturer, number.into(), request, dec!(300)).unwrap()
    }

    #[tokio::test]
    async fn test_update_requires_expected_status() {
        let claim = claim_for(UserId::new(), "CLM-20250301-AAAAAAAA");
        let port = MockClaimPort::with_claims(vec![claim.clone()]).await;

        let mut submitted = claim.clone();
        submitted.status = ClaimStatus::Submitted;
        port.update_claim(&submitted, ClaimStatus::Draft).await.unwrap();

        // A second writer still believing the claim is a draft loses.
        let mut stale = claim.clone();
        stale.work_description = "overwritten".into();
        let result = port.update_claim(&stale, ClaimStatus::Draft).await;
        assert!(result.unwrap_err().is_conflict());

        let stored = port.get_claim(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Submitted);
        assert_eq!(stored.work_description, "Tutorials");
    }

    #[tokio::test]
    async fn test_duplicate_claim_number_conflicts() {
        let port = MockClaimPort::new();
        port.insert_claim(&claim_for(UserId::new(), "CLM-20250301-AAAAAAAA")).await.unwrap();

        let result = port.insert_claim(&claim_for(UserId::new(), "CLM-20250301-AAAAAAAA")).await;
        assert!(result.unwrap_err().is_conflict());
        assert_eq!(port.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_by_user_filters_owner() {
        let lecturer = UserId::new();
        let port = MockClaimPort::with_claims(vec![
            claim_for(lecturer, "CLM-20250301-AAAAAAAA"),
            claim_for(UserId::new(), "CLM-20250301-BBBBBBBB"),
        ])
        .await;

        let claims = port.list_by_user(lecturer).await.unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].lecturer_id, lecturer);
    }

    #[tokio::test]
    async fn test_documents_counted_per_claim() {
        let port = MockDocumentPort::new();
        let claim_id = ClaimId::new();
        let doc = port
            .attach(claim_id, DocumentMetadata::new("a.pdf", "application/pdf", 3), vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(port.count_for_claim(claim_id).await.unwrap(), 1);
        assert_eq!(port.count_for_claim(ClaimId::new()).await.unwrap(), 0);
        let (stored, payload) = port.get_document(doc.id).await.unwrap();
        assert_eq!(stored, doc);
        assert_eq!(payload, vec![1, 2, 3]);
        assert!(port.get_document(DocumentId::new()).await.unwrap_err().is_not_found());
    }
}
