//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id::DocumentId;
use super::kind::{DocumentStatus, DocumentType, LinkedEntityType};

/// Maximum length of a document name, in characters.
pub const MAX_DOCUMENT_NAME_LEN: usize = 100;

/// One logical file lineage tied to a business entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Stable external identifier (`LDR-YYYYMMDD-NNNN`).
    pub document_id: DocumentId,
    /// The kind of business entity this document belongs to.
    pub linked_entity_type: LinkedEntityType,
    /// Identifier of the linked entity, validated by the caller.
    pub linked_entity_id: String,
    /// Display name (at most 100 characters).
    pub document_name: String,
    /// Classification.
    pub document_type: DocumentType,
    /// Whether privileged roles are required regardless of `access_permissions`.
    pub confidential_flag: bool,
    /// Role names authorized to act on the document.
    pub access_permissions: Vec<String>,
    /// Number of the version currently flagged as latest.
    pub current_version_number: i32,
    /// Key used for encrypted versions of this document, once issued.
    pub encryption_key_ref: Option<String>,
    /// Lifecycle state.
    pub status: DocumentStatus,
    /// Actor that uploaded the first version.
    pub created_by: String,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document or its version chain last changed.
    pub last_updated: DateTime<Utc>,
}

impl Document {
    /// Check whether the document still accepts reads and new versions.
    pub fn is_active(&self) -> bool {
        matches!(self.status, DocumentStatus::Active)
    }

    /// Check whether a role name appears in the permission set (case-insensitive).
    pub fn grants_role(&self, role: &str) -> bool {
        let role = role.trim();
        self.access_permissions
            .iter()
            .any(|granted| granted.trim().eq_ignore_ascii_case(role))
    }
}

/// Trim role names, drop empties and de-duplicate case-insensitively.
///
/// The first spelling of each role is kept so stored permissions stay
/// readable.
pub fn normalize_permissions<I, S>(roles: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for role in roles {
        let role = role.as_ref().trim();
        if role.is_empty() {
            continue;
        }
        if !normalized.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            normalized.push(role.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_permissions_dedups() {
        let roles = normalize_permissions(["Legal Officer", " legal officer ", "", "Admin"]);
        assert_eq!(roles, vec!["Legal Officer".to_string(), "Admin".to_string()]);
    }
}
