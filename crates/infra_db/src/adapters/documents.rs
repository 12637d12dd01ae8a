//! PostgreSQL Document Adapter
//!
//! Payloads are stored as `BYTEA` exactly as received; they are already
//! encrypted by the upload layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{ClaimId, DocumentId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::{Document, DocumentMetadata, DocumentPort};

use crate::error::DatabaseError;

/// Metadata columns of the `claim_documents` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub document_id: Uuid,
    pub claim_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// A document row together with its `payload` column
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredDocumentRow {
    #[sqlx(flatten)]
    pub document: DocumentRow,
    pub payload: Vec<u8>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DatabaseError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let size_bytes = u64::try_from(row.size_bytes)
            .map_err(|_| DatabaseError::CorruptRow(format!("negative size for {}", row.document_id)))?;

        Ok(Document {
            id: DocumentId::from_uuid(row.document_id),
            claim_id: ClaimId::from_uuid(row.claim_id),
            file_name: row.file_name,
            content_type: row.content_type,
            size_bytes,
            uploaded_at: row.uploaded_at,
        })
    }
}

/// PostgreSQL-backed implementation of the DocumentPort trait
#[derive(Debug, Clone)]
pub struct PostgresDocumentAdapter {
    pool: PgPool,
}

impl PostgresDocumentAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresDocumentAdapter {}

#[async_trait]
impl HealthCheckable for PostgresDocumentAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-document-adapter").await
    }
}

#[async_trait]
impl DocumentPort for PostgresDocumentAdapter {
    async fn count_for_claim(&self, claim_id: ClaimId) -> Result<u64, PortError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claim_documents WHERE claim_id = $1")
            .bind(*claim_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self, metadata, encrypted), fields(claim_id = %claim_id, size = encrypted.len()))]
    async fn attach(
        &self,
        claim_id: ClaimId,
        metadata: DocumentMetadata,
        encrypted: Vec<u8>,
    ) -> Result<Document, PortError> {
        let size = i64::try_from(metadata.size_bytes)
            .map_err(|_| PortError::validation_field("document too large", "size_bytes"))?;
        let document = Document::new(claim_id, metadata);
        debug!(document_id = %document.id, "Storing document");

        sqlx::query(
            r#"
            INSERT INTO claim_documents (
                document_id, claim_id, file_name, content_type, size_bytes, payload, uploaded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*document.id.as_uuid())
        .bind(*claim_id.as_uuid())
        .bind(&document.file_name)
        .bind(&document.content_type)
        .bind(size)
        .bind(encrypted)
        .bind(document.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(document)
    }

    async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Document>, PortError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT document_id, claim_id, file_name, content_type, size_bytes, uploaded_at
            FROM claim_documents
            WHERE claim_id = $1
            ORDER BY uploaded_at
            "#,
        )
        .bind(*claim_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Document::try_from(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self), fields(document_id = %id))]
    async fn get_document(&self, id: DocumentId) -> Result<(Document, Vec<u8>), PortError> {
        debug!("Fetching document with payload");

        let row = sqlx::query_as::<_, StoredDocumentRow>(
            r#"
            SELECT document_id, claim_id, file_name, content_type, size_bytes, uploaded_at, payload
            FROM claim_documents
            WHERE document_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("Document", id))?;

        let document = Document::try_from(row.document)?;
        Ok((document, row.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_size_is_corrupt() {
        let row = DocumentRow {
            document_id: Uuid::new_v4(),
            claim_id: Uuid::new_v4(),
            file_name: "hours.pdf".into(),
            content_type: "application/pdf".into(),
            size_bytes: -1,
            uploaded_at: Utc::now(),
        };
        assert!(matches!(Document::try_from(row), Err(DatabaseError::CorruptRow(_))));
    }
}
