//! Version control engine for append-only version chains with rollback.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_crypto::{CryptoEngine, verify_hash};
use docvault_database::store::{DocumentStore, KeyStore};
use docvault_entity::document::{Document, DocumentId, DocumentVersion};
use docvault_storage::{StorageManager, StorageRef};

use super::diff::{self, VersionDiff};
use crate::lock::DocumentLocks;

/// Tracing target for integrity alerts that need operator attention.
pub const INTEGRITY_ALERT_TARGET: &str = "docvault::integrity";

/// A blob written for a version that has not been committed yet.
#[derive(Debug, Clone)]
pub struct StagedContent {
    /// Where the blob landed.
    pub storage_ref: StorageRef,
    /// SHA-256 of the plaintext.
    pub content_hash: String,
    /// Whether the blob is a sealed envelope.
    pub encrypted: bool,
    /// Key used to seal it.
    pub encryption_key_ref: Option<String>,
    /// Plaintext length.
    pub size: i64,
}

impl StagedContent {
    /// Build the version row that records this content.
    pub fn into_version(
        self,
        document_id: &DocumentId,
        version_number: i32,
        file_format: &str,
        change_summary: Option<String>,
        actor: &str,
    ) -> DocumentVersion {
        DocumentVersion {
            document_id: document_id.clone(),
            version_number,
            is_latest_version: true,
            storage_ref: self.storage_ref.to_string(),
            content_hash: self.content_hash,
            encrypted: self.encrypted,
            encryption_key_ref: self.encryption_key_ref,
            file_format: file_format.to_string(),
            file_size_bytes: self.size,
            change_summary,
            created_by: actor.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A version committed together with the document state it produced.
#[derive(Debug, Clone)]
pub struct CommittedVersion {
    /// The document after the commit.
    pub document: Document,
    /// The new latest version.
    pub version: DocumentVersion,
}

/// Creates, lists, restores and compares document versions.
#[derive(Debug, Clone)]
pub struct VersionEngine {
    store: Arc<dyn DocumentStore>,
    keys: Arc<dyn KeyStore>,
    crypto: Arc<CryptoEngine>,
    storage: StorageManager,
    locks: Arc<DocumentLocks>,
    /// Encrypt non-confidential documents too.
    encrypt_all: bool,
}

impl VersionEngine {
    /// Creates a new version engine.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        keys: Arc<dyn KeyStore>,
        crypto: Arc<CryptoEngine>,
        storage: StorageManager,
        locks: Arc<DocumentLocks>,
        encrypt_all: bool,
    ) -> Self {
        Self {
            store,
            keys,
            crypto,
            storage,
            locks,
            encrypt_all,
        }
    }

    /// The per-document lock table shared with the orchestrator.
    pub fn locks(&self) -> &Arc<DocumentLocks> {
        &self.locks
    }

    /// Digest, optionally seal, and write content for `version_number` of `document`.
    ///
    /// Content is sealed when the document is confidential or
    /// `encrypt_all` is set. The document's key is reused; a new key is
    /// issued the first time one is needed and persisted only once the
    /// blob is written. A commit that fails after staging leaves that
    /// descriptor unreferenced.
    pub async fn stage_content(
        &self,
        document: &Document,
        version_number: i32,
        content: &[u8],
    ) -> AppResult<StagedContent> {
        let content_hash = self.crypto.digest(content);
        let encrypt = document.confidential_flag || self.encrypt_all;

        let mut issued = None;
        let (blob, encryption_key_ref) = if encrypt {
            let key_ref = match &document.encryption_key_ref {
                Some(key_ref) => {
                    self.ensure_key(key_ref).await?;
                    key_ref.clone()
                }
                None => {
                    let key = self.crypto.issue_key();
                    let key_ref = key.key_ref.clone();
                    issued = Some(key);
                    key_ref
                }
            };
            (self.crypto.seal(content, &key_ref)?, Some(key_ref))
        } else {
            (Bytes::copy_from_slice(content), None)
        };

        let key = format!(
            "documents/{}/v{version_number}-{}.bin",
            document.document_id,
            Uuid::new_v4().simple()
        );
        let storage_ref = self.storage.write(&key, blob).await?;

        if let Some(issued) = issued {
            if let Err(e) = self.keys.insert_key(&issued).await {
                self.discard(&storage_ref).await;
                return Err(e);
            }
        }

        Ok(StagedContent {
            storage_ref,
            content_hash,
            encrypted: encrypt,
            encryption_key_ref,
            size: content.len() as i64,
        })
    }

    /// Remove a staged blob that will never be committed.
    pub async fn discard(&self, reference: &StorageRef) {
        if let Err(e) = self.storage.delete(reference).await {
            warn!(storage_ref = %reference, error = %e, "Failed to discard uncommitted blob");
        }
    }

    /// Append a new latest version to an active document.
    pub async fn create_version(
        &self,
        document_id: &DocumentId,
        content: &[u8],
        file_format: &str,
        change_summary: &str,
        actor: &str,
    ) -> AppResult<CommittedVersion> {
        if change_summary.trim().is_empty() {
            return Err(AppError::validation("A change summary is required"));
        }

        let _guard = self.locks.lock(document_id).await;

        let document = self.load_active(document_id).await?;
        let expected = document.current_version_number;
        let next = expected + 1;

        let staged = self.stage_content(&document, next, content).await?;
        let reference = staged.storage_ref.clone();
        let version = staged.into_version(
            document_id,
            next,
            file_format,
            Some(change_summary.trim().to_string()),
            actor,
        );

        match self.store.commit_version(expected, &version).await {
            Ok(document) => {
                info!(
                    document_id = %document_id,
                    version = next,
                    encrypted = version.encrypted,
                    storage_ref = %version.storage_ref,
                    "Version created"
                );
                Ok(CommittedVersion { document, version })
            }
            Err(e) => {
                self.discard(&reference).await;
                if e.is(ErrorKind::VersionConflict) {
                    warn!(document_id = %document_id, expected, "Version conflict");
                }
                Err(e)
            }
        }
    }

    /// List versions newest first.
    pub async fn list_versions(
        &self,
        document_id: &DocumentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentVersion>> {
        self.store.list_versions(document_id, page).await
    }

    /// Find one version, failing with `NotFound` when it does not exist.
    pub async fn get_version(
        &self,
        document_id: &DocumentId,
        version_number: i32,
    ) -> AppResult<DocumentVersion> {
        self.store
            .find_version(document_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_number} of {document_id} not found"))
            })
    }

    /// Re-publish the content of `target` as a new latest version.
    ///
    /// The target and every version after it stay untouched.
    pub async fn rollback(
        &self,
        document_id: &DocumentId,
        target: i32,
        actor: &str,
    ) -> AppResult<CommittedVersion> {
        let version = self.get_version(document_id, target).await?;
        let content = self.read_content(&version).await?;

        self.create_version(
            document_id,
            &content,
            &version.file_format,
            &format!("Rollback to v{target}"),
            actor,
        )
        .await
    }

    /// Compare two versions.
    pub async fn diff(&self, document_id: &DocumentId, from: i32, to: i32) -> AppResult<VersionDiff> {
        let from_version = self.get_version(document_id, from).await?;
        let to_version = self.get_version(document_id, to).await?;
        let from_content = self.read_content(&from_version).await?;
        let to_content = self.read_content(&to_version).await?;
        Ok(diff::compare(&from_version, &from_content, &to_version, &to_content))
    }

    /// Fetch, unseal and verify a version's content.
    ///
    /// Any integrity failure raises an operator alert and returns no content.
    pub async fn read_content(&self, version: &DocumentVersion) -> AppResult<Vec<u8>> {
        let reference: StorageRef = version.storage_ref.parse()?;
        let blob = self.storage.read(&reference).await?;

        let plaintext = if version.encrypted {
            let key_ref = version.encryption_key_ref.as_deref().ok_or_else(|| {
                AppError::crypto(format!(
                    "Version {} of {} is encrypted but has no key",
                    version.version_number, version.document_id
                ))
            })?;
            self.ensure_key(key_ref).await?;
            self.crypto
                .open(&blob, key_ref)
                .map_err(|e| self.integrity_alert(version, e))?
        } else {
            blob.to_vec()
        };

        verify_hash(&plaintext, &version.content_hash).map_err(|e| self.integrity_alert(version, e))?;
        Ok(plaintext)
    }

    async fn load_active(&self, document_id: &DocumentId) -> AppResult<Document> {
        match self.store.find_document(document_id).await? {
            Some(document) if document.is_active() => Ok(document),
            Some(_) => Err(AppError::not_found(format!("Document {document_id} has been deleted"))),
            None => Err(AppError::not_found(format!("Document {document_id} not found"))),
        }
    }

    /// Make sure the crypto engine knows `key_ref`, loading it from the key store.
    async fn ensure_key(&self, key_ref: &str) -> AppResult<()> {
        if self.crypto.has_key(key_ref) {
            return Ok(());
        }
        let key = self
            .keys
            .find_key(key_ref)
            .await?
            .ok_or_else(|| AppError::crypto(format!("Encryption key {key_ref} is missing")))?;
        self.crypto.register_key(key)
    }

    fn integrity_alert(&self, version: &DocumentVersion, err: AppError) -> AppError {
        if err.is(ErrorKind::Integrity) {
            error!(
                target: INTEGRITY_ALERT_TARGET,
                document_id = %version.document_id,
                version = version.version_number,
                storage_ref = %version.storage_ref,
                error = %err,
                "Stored content failed integrity verification"
            );
        }
        err
    }
}
