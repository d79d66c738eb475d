//! Results returned by the document service.

use bytes::Bytes;
use serde::Serialize;

use docvault_core::error::ErrorKind;
use docvault_entity::document::{Document, DocumentVersion};

/// A newly created document with its first version.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    /// The persisted document.
    pub document: Document,
    /// Version 1.
    pub version: DocumentVersion,
}

/// Verified content of one version.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    /// The document.
    pub document: Document,
    /// The version that was read.
    pub version: DocumentVersion,
    /// Decrypted plaintext whose hash matched.
    pub content: Bytes,
}

/// Best-effort storage cleanup after a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Blobs removed from local backends.
    pub local_files_deleted: u32,
    /// Blobs removed from object-storage backends.
    pub remote_files_deleted: u32,
    /// Blobs that were already gone.
    pub files_not_found: u32,
    /// One message per blob that could not be removed.
    pub errors: Vec<String>,
}

impl CleanupReport {
    /// Whether every blob was removed or already gone.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of deleting a document.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    /// The document, now marked deleted.
    pub document: Document,
    /// What happened to the stored blobs.
    pub cleanup: CleanupReport,
}

/// One upload that failed inside a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BulkUploadFailure {
    /// Position in the submitted batch.
    pub index: usize,
    /// Name of the failed document.
    pub document_name: String,
    /// Error category.
    pub kind: ErrorKind,
    /// Error message.
    pub reason: String,
}

/// Per-item results of a batch upload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkUploadResult {
    /// Uploads that completed.
    pub succeeded: Vec<UploadOutcome>,
    /// Uploads that failed, with reasons.
    pub failed: Vec<BulkUploadFailure>,
}
