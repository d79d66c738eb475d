//! Access log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::{AccessAction, AccessDecision};
use crate::document::DocumentId;

/// An immutable record of one access attempt, allowed or denied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AccessLogEntry {
    /// Opaque entry identifier.
    pub id: Uuid,
    /// The document the attempt targeted.
    pub document_id: DocumentId,
    /// The acting principal.
    pub actor: String,
    /// What was attempted.
    pub action: AccessAction,
    /// Whether the access evaluator allowed it.
    pub decision: AccessDecision,
    /// Denial reason, or the failure that ended an allowed attempt.
    pub reason: Option<String>,
    /// When the attempt was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Data required to append an access log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccessLogEntry {
    /// Target document.
    pub document_id: DocumentId,
    /// Acting principal.
    pub actor: String,
    /// Attempted action.
    pub action: AccessAction,
    /// Evaluator decision.
    pub decision: AccessDecision,
    /// Optional reason.
    pub reason: Option<String>,
}
