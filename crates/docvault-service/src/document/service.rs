//! Document repository orchestrator.
//!
//! Every public operation follows the same shape: resolve the document,
//! evaluate access (fail-closed), do the work, then write exactly one audit
//! entry. Uploads that fail field validation are rejected before an id is
//! allocated and leave no audit entry; on every other operation a field
//! error is recorded as the reason of the ALLOWED entry.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};

use docvault_auth::{AccessEvaluator, Verdict};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::{BackendKind, DeleteOutcome};
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::store::DocumentStore;
use docvault_entity::audit::AccessAction;
use docvault_entity::document::{Document, DocumentId, DocumentStatus, DocumentVersion};
use docvault_storage::{StorageManager, StorageRef};

use super::outcome::{
    BulkUploadFailure, BulkUploadResult, CleanupReport, DeletionOutcome, RetrievedDocument,
    UploadOutcome,
};
use super::request::{AccessSettingsUpdate, UpdateRequest, UploadRequest};
use crate::audit::AuditLogger;
use crate::context::RequestContext;
use crate::version::{CommittedVersion, VersionDiff, VersionEngine};

/// Reason recorded when a request names a document that does not exist.
pub const DOCUMENT_NOT_FOUND: &str = "document not found";

/// Entry point for every document operation.
#[derive(Debug, Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    versions: Arc<VersionEngine>,
    audit: Arc<AuditLogger>,
    evaluator: AccessEvaluator,
    storage: StorageManager,
    /// Largest accepted content, in bytes.
    max_upload_size: u64,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        versions: Arc<VersionEngine>,
        audit: Arc<AuditLogger>,
        evaluator: AccessEvaluator,
        storage: StorageManager,
        max_upload_size: u64,
    ) -> Self {
        Self {
            store,
            versions,
            audit,
            evaluator,
            storage,
            max_upload_size,
        }
    }

    /// Create a document and its first version.
    pub async fn upload(&self, ctx: &RequestContext, request: UploadRequest) -> AppResult<UploadOutcome> {
        let permissions = request.check(self.max_upload_size)?;

        let today = Utc::now().date_naive();
        let sequence = self.store.next_document_sequence(today).await?;
        let document_id = DocumentId::generate(today, sequence);

        let now = Utc::now();
        let mut document = Document {
            document_id: document_id.clone(),
            linked_entity_type: request.linked_entity_type,
            linked_entity_id: request.linked_entity_id.trim().to_string(),
            document_name: request.document_name.trim().to_string(),
            document_type: request.document_type,
            confidential_flag: request.confidential,
            access_permissions: permissions,
            current_version_number: 1,
            encryption_key_ref: None,
            status: DocumentStatus::Active,
            created_by: ctx.actor.clone(),
            created_at: now,
            last_updated: now,
        };

        self.authorize(ctx, &document, AccessAction::Update).await?;

        let result = async {
            let staged = self.versions.stage_content(&document, 1, &request.content).await?;
            let reference = staged.storage_ref.clone();
            document.encryption_key_ref = staged.encryption_key_ref.clone();
            let version =
                staged.into_version(&document_id, 1, &request.file_format, None, &ctx.actor);

            if let Err(e) = self.store.create_document(&document, &version).await {
                self.versions.discard(&reference).await;
                return Err(e);
            }

            info!(
                document_id = %document_id,
                actor = %ctx.actor,
                confidential = document.confidential_flag,
                bytes = version.file_size_bytes,
                "Document uploaded"
            );
            Ok::<_, AppError>(UploadOutcome {
                document: document.clone(),
                version,
            })
        }
        .await;

        self.finish(ctx, &document_id, AccessAction::Update, result).await
    }

    /// Upload each item independently, collecting successes and failures.
    pub async fn bulk_upload(
        &self,
        ctx: &RequestContext,
        requests: Vec<UploadRequest>,
    ) -> BulkUploadResult {
        let mut result = BulkUploadResult::default();
        for (index, request) in requests.into_iter().enumerate() {
            let document_name = request.document_name.clone();
            match self.upload(ctx, request).await {
                Ok(outcome) => result.succeeded.push(outcome),
                Err(e) => {
                    warn!(index, document_name = %document_name, error = %e, "Bulk upload item failed");
                    result.failed.push(BulkUploadFailure {
                        index,
                        document_name,
                        kind: e.kind,
                        reason: e.message,
                    });
                }
            }
        }
        info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "Bulk upload finished"
        );
        result
    }

    /// Read the latest or a specific version for inline viewing.
    pub async fn retrieve(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        version: Option<i32>,
    ) -> AppResult<RetrievedDocument> {
        self.read(ctx, document_id, version, AccessAction::View).await
    }

    /// Read the latest or a specific version for export.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        version: Option<i32>,
    ) -> AppResult<RetrievedDocument> {
        self.read(ctx, document_id, version, AccessAction::Download).await
    }

    /// Return the document record without content.
    pub async fn get_metadata(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
    ) -> AppResult<Document> {
        let document = self.resolve(ctx, document_id, AccessAction::View, false).await?;
        self.authorize(ctx, &document, AccessAction::View).await?;
        self.finish(ctx, document_id, AccessAction::View, Ok(document)).await
    }

    /// Add a new version with fresh content.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        request: UpdateRequest,
    ) -> AppResult<CommittedVersion> {
        let document = self.resolve(ctx, document_id, AccessAction::Update, false).await?;
        self.authorize(ctx, &document, AccessAction::Update).await?;

        let result = async {
            request.check(self.max_upload_size)?;
            self.versions
                .create_version(
                    document_id,
                    &request.content,
                    &request.file_format,
                    &request.change_summary,
                    &ctx.actor,
                )
                .await
        }
        .await;
        self.finish(ctx, document_id, AccessAction::Update, result).await
    }

    /// Change the confidentiality flag and/or permission set.
    ///
    /// Enabling confidentiality makes every later version encrypted.
    pub async fn update_access(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        update: AccessSettingsUpdate,
    ) -> AppResult<Document> {
        let _guard = self.versions.locks().lock(document_id).await;
        let document = self.resolve(ctx, document_id, AccessAction::Update, false).await?;
        self.authorize(ctx, &document, AccessAction::Update).await?;

        let result = async {
            let permissions = update
                .check()?
                .unwrap_or_else(|| document.access_permissions.clone());
            let confidential = update.confidential.unwrap_or(document.confidential_flag);
            let updated = self
                .store
                .update_access_settings(document_id, confidential, &permissions)
                .await?;
            info!(
                document_id = %document_id,
                actor = %ctx.actor,
                confidential = updated.confidential_flag,
                roles = updated.access_permissions.len(),
                "Access settings updated"
            );
            Ok::<_, AppError>(updated)
        }
        .await;
        self.finish(ctx, document_id, AccessAction::Update, result).await
    }

    /// Re-publish an earlier version as the newest one.
    pub async fn rollback(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        target: i32,
    ) -> AppResult<CommittedVersion> {
        let document = self.resolve(ctx, document_id, AccessAction::Rollback, false).await?;
        self.authorize(ctx, &document, AccessAction::Rollback).await?;

        let result = self.versions.rollback(document_id, target, &ctx.actor).await;
        self.finish(ctx, document_id, AccessAction::Rollback, result).await
    }

    /// List versions newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentVersion>> {
        let document = self.resolve(ctx, document_id, AccessAction::View, false).await?;
        self.authorize(ctx, &document, AccessAction::View).await?;

        let result = self.versions.list_versions(document_id, page).await;
        self.finish(ctx, document_id, AccessAction::View, result).await
    }

    /// Compare two versions.
    pub async fn diff(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        from: i32,
        to: i32,
    ) -> AppResult<VersionDiff> {
        let document = self.resolve(ctx, document_id, AccessAction::View, false).await?;
        self.authorize(ctx, &document, AccessAction::View).await?;

        let result = self.versions.diff(document_id, from, to).await;
        self.finish(ctx, document_id, AccessAction::View, result).await
    }

    /// Mark a document deleted and remove every stored version.
    ///
    /// Cleanup is best effort: backend failures are collected in the report
    /// and never undo the status change. Deleting an already-deleted
    /// document repeats the cleanup and counts missing blobs as not found.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
    ) -> AppResult<DeletionOutcome> {
        let document = self.resolve(ctx, document_id, AccessAction::Delete, true).await?;
        self.authorize(ctx, &document, AccessAction::Delete).await?;

        let marked = {
            let _guard = self.versions.locks().lock(document_id).await;
            self.store.mark_deleted(document_id).await
        };
        let document = match marked {
            Ok(document) => document,
            Err(e) => return self.finish(ctx, document_id, AccessAction::Delete, Err(e)).await,
        };

        let cleanup = match self.store.all_versions(document_id).await {
            Ok(versions) => self.cleanup(&versions).await,
            Err(e) => CleanupReport {
                errors: vec![format!("failed to list versions: {}", e.message)],
                ..Default::default()
            },
        };

        info!(
            document_id = %document_id,
            actor = %ctx.actor,
            local_deleted = cleanup.local_files_deleted,
            remote_deleted = cleanup.remote_files_deleted,
            not_found = cleanup.files_not_found,
            errors = cleanup.errors.len(),
            "Document deleted"
        );

        let reason = (!cleanup.is_complete()).then(|| {
            format!(
                "storage cleanup incomplete: {} error(s)",
                cleanup.errors.len()
            )
        });
        self.audit
            .allowed(ctx, document_id, AccessAction::Delete, reason)
            .await?;

        Ok(DeletionOutcome { document, cleanup })
    }

    async fn read(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        version: Option<i32>,
        action: AccessAction,
    ) -> AppResult<RetrievedDocument> {
        let document = self.resolve(ctx, document_id, action, false).await?;
        self.authorize(ctx, &document, action).await?;

        let result = async {
            let number = version.unwrap_or(document.current_version_number);
            let version = self.versions.get_version(document_id, number).await?;
            let content = self.versions.read_content(&version).await?;
            Ok::<_, AppError>(RetrievedDocument {
                document: document.clone(),
                version,
                content: Bytes::from(content),
            })
        }
        .await;
        self.finish(ctx, document_id, action, result).await
    }

    async fn cleanup(&self, versions: &[DocumentVersion]) -> CleanupReport {
        let mut report = CleanupReport::default();
        for version in versions {
            let reference: StorageRef = match version.storage_ref.parse() {
                Ok(reference) => reference,
                Err(e) => {
                    report.errors.push(format!("v{}: {}", version.version_number, e.message));
                    continue;
                }
            };

            match self.storage.delete(&reference).await {
                Ok((BackendKind::Local, DeleteOutcome::Deleted)) => report.local_files_deleted += 1,
                Ok((BackendKind::Object, DeleteOutcome::Deleted)) => report.remote_files_deleted += 1,
                Ok((_, DeleteOutcome::NotFound)) => report.files_not_found += 1,
                Err(e) => {
                    warn!(storage_ref = %reference, error = %e, "Failed to delete blob");
                    report
                        .errors
                        .push(format!("v{} ({reference}): {}", version.version_number, e.message));
                }
            }
        }
        report
    }

    /// Load the target document, logging a denial when it does not exist.
    async fn resolve(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        action: AccessAction,
        include_deleted: bool,
    ) -> AppResult<Document> {
        match self.store.find_document(document_id).await? {
            Some(document) if include_deleted || document.is_active() => Ok(document),
            _ => {
                self.audit
                    .denied(ctx, document_id, action, DOCUMENT_NOT_FOUND)
                    .await?;
                Err(AppError::not_found(format!("Document {document_id} not found")))
            }
        }
    }

    /// Evaluate access, logging and failing on denial.
    async fn authorize(
        &self,
        ctx: &RequestContext,
        document: &Document,
        action: AccessAction,
    ) -> AppResult<()> {
        match self.evaluator.evaluate(&ctx.roles, action, document) {
            Verdict::Allowed => Ok(()),
            Verdict::Denied(reason) => {
                warn!(
                    document_id = %document.document_id,
                    actor = %ctx.actor,
                    action = %action,
                    reason = %reason,
                    "Access denied"
                );
                self.audit
                    .denied(ctx, &document.document_id, action, reason.clone())
                    .await?;
                Err(AppError::access_denied(reason))
            }
        }
    }

    /// Write the single ALLOWED entry for an authorized operation.
    ///
    /// A failed operation is logged with its error as the reason. An audit
    /// write failure takes precedence over the operation's own result.
    async fn finish<T>(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        action: AccessAction,
        result: AppResult<T>,
    ) -> AppResult<T> {
        let failure = result.as_ref().err().map(ToString::to_string);
        if let Err(audit_err) = self.audit.allowed(ctx, document_id, action, failure).await {
            if let Err(op_err) = &result {
                error!(document_id = %document_id, error = %op_err, "Operation failed and was not audited");
            }
            return Err(audit_err);
        }
        result
    }
}
