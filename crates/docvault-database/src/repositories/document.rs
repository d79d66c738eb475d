//! Document and version repository implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::debug;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::document::{Document, DocumentId, DocumentStatus, DocumentVersion};

use crate::store::DocumentStore;

const INSERT_VERSION_SQL: &str = "INSERT INTO document_versions \
    (document_id, version_number, is_latest_version, storage_ref, content_hash, encrypted, \
     encryption_key_ref, file_format, file_size_bytes, change_summary, created_by, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)";

/// Repository for documents and their version chains.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bind every version column to an insert.
fn bind_version<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    version: &'q DocumentVersion,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(&version.document_id)
        .bind(version.version_number)
        .bind(version.is_latest_version)
        .bind(&version.storage_ref)
        .bind(&version.content_hash)
        .bind(version.encrypted)
        .bind(&version.encryption_key_ref)
        .bind(&version.file_format)
        .bind(version.file_size_bytes)
        .bind(&version.change_summary)
        .bind(&version.created_by)
        .bind(version.created_at)
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn next_document_sequence(&self, day: NaiveDate) -> AppResult<u32> {
        let value: i32 = sqlx::query_scalar(
            "INSERT INTO document_id_sequences (day, last_value) VALUES ($1, 1) \
             ON CONFLICT (day) DO UPDATE SET last_value = document_id_sequences.last_value + 1 \
             RETURNING last_value",
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to allocate document sequence", e)
        })?;
        Ok(value as u32)
    }

    async fn create_document(&self, document: &Document, first: &DocumentVersion) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "INSERT INTO documents (document_id, linked_entity_type, linked_entity_id, document_name, \
             document_type, confidential_flag, access_permissions, current_version_number, \
             encryption_key_ref, status, created_by, created_at, last_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&document.document_id)
        .bind(document.linked_entity_type)
        .bind(&document.linked_entity_id)
        .bind(&document.document_name)
        .bind(document.document_type)
        .bind(document.confidential_flag)
        .bind(&document.access_permissions)
        .bind(document.current_version_number)
        .bind(&document.encryption_key_ref)
        .bind(document.status)
        .bind(&document.created_by)
        .bind(document.created_at)
        .bind(document.last_updated)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create document", e))?;

        bind_version(sqlx::query(INSERT_VERSION_SQL), first)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create first version", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit document", e)
        })?;

        debug!(document_id = %document.document_id, "Persisted document");
        Ok(())
    }

    async fn find_document(&self, id: &DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE document_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn commit_version(
        &self,
        expected_current: i32,
        version: &DocumentVersion,
    ) -> AppResult<Document> {
        let id = &version.document_id;
        if version.version_number != expected_current + 1 {
            return Err(AppError::internal(format!(
                "Version {} does not follow v{expected_current} of {id}",
                version.version_number
            )));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let advanced = sqlx::query_as::<_, Document>(
            "UPDATE documents SET current_version_number = $2, last_updated = $3, \
             encryption_key_ref = COALESCE(encryption_key_ref, $4) \
             WHERE document_id = $1 AND current_version_number = $5 AND status = 'active' \
             RETURNING *",
        )
        .bind(id)
        .bind(version.version_number)
        .bind(version.created_at)
        .bind(&version.encryption_key_ref)
        .bind(expected_current)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to advance document", e))?;

        let Some(document) = advanced else {
            // Nothing was written; the transaction rolls back on drop.
            let current = self.find_document(id).await?;
            return Err(match current {
                None => AppError::not_found(format!("Document {id} not found")),
                Some(doc) if doc.status == DocumentStatus::Deleted => {
                    AppError::not_found(format!("Document {id} has been deleted"))
                }
                Some(doc) => AppError::version_conflict(format!(
                    "Document {id} moved to v{} while v{} was being written",
                    doc.current_version_number, version.version_number
                )),
            });
        };

        sqlx::query(
            "UPDATE document_versions SET is_latest_version = FALSE \
             WHERE document_id = $1 AND is_latest_version",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to clear latest version", e)
        })?;

        bind_version(sqlx::query(INSERT_VERSION_SQL), version)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert version", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit version", e)
        })?;

        Ok(document)
    }

    async fn update_access_settings(
        &self,
        id: &DocumentId,
        confidential: bool,
        permissions: &[String],
    ) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET confidential_flag = $2, access_permissions = $3, last_updated = $4 \
             WHERE document_id = $1 AND status = 'active' RETURNING *",
        )
        .bind(id)
        .bind(confidential)
        .bind(permissions)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update access settings", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn mark_deleted(&self, id: &DocumentId) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET status = 'deleted', \
             last_updated = CASE WHEN status = 'active' THEN $2 ELSE last_updated END \
             WHERE document_id = $1 RETURNING *",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete document", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn find_version(
        &self,
        id: &DocumentId,
        version_number: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 AND version_number = $2",
        )
        .bind(id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn list_versions(
        &self,
        id: &DocumentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentVersion>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_versions WHERE document_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count versions", e)
                })?;

        let versions = sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 \
             ORDER BY version_number DESC LIMIT $2 OFFSET $3",
        )
        .bind(id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))?;

        Ok(PageResponse::new(
            versions,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn all_versions(&self, id: &DocumentId) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 ORDER BY version_number ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load versions", e))
    }
}
