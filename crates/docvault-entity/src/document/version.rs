//! Document version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id::DocumentId;

/// One immutable snapshot of a document's content.
///
/// Rows are keyed by `(document_id, version_number)`. Once written, the
/// storage reference and content hash never change; only
/// `is_latest_version` flips when a newer version is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// The owning document.
    pub document_id: DocumentId,
    /// 1-based, contiguous version number.
    pub version_number: i32,
    /// Whether this is the authoritative version.
    pub is_latest_version: bool,
    /// Self-describing locator (`<backend>://<key>`).
    pub storage_ref: String,
    /// Lower-case hex SHA-256 of the plaintext.
    pub content_hash: String,
    /// Whether the stored blob is a sealed (encrypted) envelope.
    pub encrypted: bool,
    /// Key used to seal the blob.
    pub encryption_key_ref: Option<String>,
    /// Declared MIME type of the content.
    pub file_format: String,
    /// Plaintext size in bytes.
    pub file_size_bytes: i64,
    /// Description of the change; absent only for version 1.
    pub change_summary: Option<String>,
    /// Actor that created the version.
    pub created_by: String,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
}
