//! Audit logger: appends one entry per access attempt and reads the trail.

use std::sync::Arc;

use tracing::{error, info};

use docvault_core::error::AppError;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::store::{AccessLogFilter, AccessLogStore};
use docvault_entity::audit::{AccessAction, AccessDecision, AccessLogEntry, CreateAccessLogEntry};
use docvault_entity::document::DocumentId;

use crate::context::RequestContext;

/// Records access attempts in the append-only trail.
///
/// A failed write is returned to the caller rather than dropped, so an
/// operation never completes without its audit entry.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    store: Arc<dyn AccessLogStore>,
}

impl AuditLogger {
    /// Creates a new audit logger.
    pub fn new(store: Arc<dyn AccessLogStore>) -> Self {
        Self { store }
    }

    /// Append one entry.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        action: AccessAction,
        decision: AccessDecision,
        reason: Option<String>,
    ) -> Result<AccessLogEntry, AppError> {
        let entry = CreateAccessLogEntry {
            document_id: document_id.clone(),
            actor: ctx.actor.clone(),
            action,
            decision,
            reason,
        };

        let recorded = self.store.append(&entry).await.map_err(|e| {
            error!(
                document_id = %document_id,
                actor = %ctx.actor,
                action = %action,
                error = %e,
                "Failed to write audit entry"
            );
            e
        })?;

        info!(
            document_id = %document_id,
            actor = %ctx.actor,
            action = %action,
            decision = %decision,
            ip = ctx.ip_address.as_deref().unwrap_or("-"),
            "Access recorded"
        );
        Ok(recorded)
    }

    /// Record an allowed attempt. `failure` carries the error that ended it, if any.
    pub async fn allowed(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        action: AccessAction,
        failure: Option<String>,
    ) -> Result<AccessLogEntry, AppError> {
        self.record(ctx, document_id, action, AccessDecision::Allowed, failure)
            .await
    }

    /// Record a denied attempt.
    pub async fn denied(
        &self,
        ctx: &RequestContext,
        document_id: &DocumentId,
        action: AccessAction,
        reason: impl Into<String>,
    ) -> Result<AccessLogEntry, AppError> {
        self.record(
            ctx,
            document_id,
            action,
            AccessDecision::Denied,
            Some(reason.into()),
        )
        .await
    }

    /// Entries for one document, newest first.
    pub async fn history(
        &self,
        document_id: &DocumentId,
        page: &PageRequest,
    ) -> Result<PageResponse<AccessLogEntry>, AppError> {
        let filter = AccessLogFilter {
            document_id: Some(document_id.clone()),
            ..Default::default()
        };
        self.store.search(&filter, page).await
    }

    /// Search the whole trail, newest first.
    pub async fn search(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<AccessLogEntry>, AppError> {
        self.store.search(filter, page).await
    }
}
