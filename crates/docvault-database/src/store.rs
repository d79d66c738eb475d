//! Persistence seams used by the service layer.
//!
//! The PostgreSQL repositories and the in-memory store implement the same
//! traits and uphold the same invariants, so services never depend on a
//! concrete backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::audit::{AccessAction, AccessDecision, AccessLogEntry, CreateAccessLogEntry};
use docvault_entity::document::{Document, DocumentId, DocumentVersion};
use docvault_entity::key::EncryptionKey;

/// Documents and their version chains.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Allocate the next 1-based sequence number for documents created on `day`.
    ///
    /// Numbers are never reused, even when the upload that drew one fails.
    async fn next_document_sequence(&self, day: NaiveDate) -> AppResult<u32>;

    /// Persist a new document together with its first version.
    ///
    /// Both rows are written or neither is.
    async fn create_document(&self, document: &Document, first: &DocumentVersion) -> AppResult<()>;

    /// Find a document by id, in any status.
    async fn find_document(&self, id: &DocumentId) -> AppResult<Option<Document>>;

    /// Append `version` as the new latest version.
    ///
    /// Atomically clears the previous latest flag, inserts the version and
    /// advances the document counter, provided the stored counter still
    /// equals `expected_current`. Otherwise nothing changes and a
    /// `VersionConflict` error is returned. The document adopts the
    /// version's key ref if it has none yet.
    async fn commit_version(
        &self,
        expected_current: i32,
        version: &DocumentVersion,
    ) -> AppResult<Document>;

    /// Replace the confidentiality flag and permission set of an active document.
    async fn update_access_settings(
        &self,
        id: &DocumentId,
        confidential: bool,
        permissions: &[String],
    ) -> AppResult<Document>;

    /// Mark a document deleted. Deleting an already-deleted document is a no-op.
    async fn mark_deleted(&self, id: &DocumentId) -> AppResult<Document>;

    /// Find one version of a document.
    async fn find_version(
        &self,
        id: &DocumentId,
        version_number: i32,
    ) -> AppResult<Option<DocumentVersion>>;

    /// List versions newest first.
    async fn list_versions(
        &self,
        id: &DocumentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentVersion>>;

    /// Every version of a document, oldest first.
    async fn all_versions(&self, id: &DocumentId) -> AppResult<Vec<DocumentVersion>>;
}

/// Encryption key descriptors.
#[async_trait]
pub trait KeyStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a newly issued descriptor.
    async fn insert_key(&self, key: &EncryptionKey) -> AppResult<()>;

    /// Find a descriptor by reference.
    async fn find_key(&self, key_ref: &str) -> AppResult<Option<EncryptionKey>>;
}

/// Criteria for searching the access log. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessLogFilter {
    /// Restrict to one document.
    pub document_id: Option<DocumentId>,
    /// Restrict to one actor.
    pub actor: Option<String>,
    /// Restrict to one action.
    pub action: Option<AccessAction>,
    /// Restrict to one decision.
    pub decision: Option<AccessDecision>,
    /// Only entries at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

impl AccessLogFilter {
    /// Whether an entry satisfies every set criterion.
    pub fn matches(&self, entry: &AccessLogEntry) -> bool {
        self.document_id.as_ref().is_none_or(|id| *id == entry.document_id)
            && self.actor.as_ref().is_none_or(|a| *a == entry.actor)
            && self.action.is_none_or(|a| a == entry.action)
            && self.decision.is_none_or(|d| d == entry.decision)
            && self.since.is_none_or(|t| entry.timestamp >= t)
    }
}

/// The append-only access audit trail.
#[async_trait]
pub trait AccessLogStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append one entry. Entries are never updated or removed.
    async fn append(&self, entry: &CreateAccessLogEntry) -> AppResult<AccessLogEntry>;

    /// Search the trail, newest first.
    async fn search(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLogEntry>>;
}
