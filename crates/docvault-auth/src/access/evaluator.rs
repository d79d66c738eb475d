//! Access evaluation: decides whether an actor's roles permit an action on a
//! document.

use serde::{Deserialize, Serialize};
use tracing::debug;

use docvault_core::error::AppError;
use docvault_entity::audit::AccessAction;
use docvault_entity::document::Document;

use super::policy::AccessPolicy;

/// Outcome of an access evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The action may proceed.
    Allowed,
    /// The action is refused, with the reason recorded in the audit trail.
    Denied(String),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

/// Evaluates role and confidentiality rules.
///
/// Evaluation is pure: it reads the document's permission set and
/// confidentiality flag and never touches the audit trail. Recording the
/// decision is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct AccessEvaluator {
    policy: AccessPolicy,
}

impl AccessEvaluator {
    /// Creates an evaluator with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator with a custom policy.
    pub fn with_policy(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    /// Returns the underlying policy.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Decide whether `roles` may perform `action` on `document`.
    pub fn evaluate(&self, roles: &[String], action: AccessAction, document: &Document) -> Verdict {
        let verdict = self.decide(roles, action, document);
        debug!(
            document_id = %document.document_id,
            action = %action,
            allowed = verdict.is_allowed(),
            "Access evaluated"
        );
        verdict
    }

    /// Like [`evaluate`](Self::evaluate), mapping a denial to `AccessDenied`.
    pub fn require(
        &self,
        roles: &[String],
        action: AccessAction,
        document: &Document,
    ) -> Result<(), AppError> {
        match self.evaluate(roles, action, document) {
            Verdict::Allowed => Ok(()),
            Verdict::Denied(reason) => Err(AppError::access_denied(reason)),
        }
    }

    fn decide(&self, roles: &[String], action: AccessAction, document: &Document) -> Verdict {
        if !roles.iter().any(|role| document.grants_role(role)) {
            return Verdict::Denied(format!(
                "none of the actor's roles is permitted to {} this document",
                action.as_str().to_lowercase()
            ));
        }

        if !document.confidential_flag {
            return Verdict::Allowed;
        }

        if !roles.iter().any(|role| self.policy.is_privileged(role)) {
            return Verdict::Denied("confidential document requires a privileged role".to_string());
        }

        if action == AccessAction::Delete
            && !roles.iter().any(|role| self.policy.may_delete_confidential(role))
        {
            return Verdict::Denied(format!(
                "deleting a confidential document requires the {} role",
                self.policy.confidential_delete_role
            ));
        }

        Verdict::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docvault_entity::document::{DocumentId, DocumentStatus, DocumentType, LinkedEntityType};

    fn document(confidential: bool, permissions: &[&str]) -> Document {
        let now = Utc::now();
        Document {
            document_id: DocumentId::generate(now.date_naive(), 1),
            linked_entity_type: LinkedEntityType::Case,
            linked_entity_id: "CASE-77".into(),
            document_name: "Order".into(),
            document_type: DocumentType::CourtOrder,
            confidential_flag: confidential,
            access_permissions: permissions.iter().map(|s| s.to_string()).collect(),
            current_version_number: 1,
            encryption_key_ref: None,
            status: DocumentStatus::Active,
            created_by: "u1".into(),
            created_at: now,
            last_updated: now,
        }
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_non_confidential_any_action_with_matching_role() {
        let evaluator = AccessEvaluator::new();
        let doc = document(false, &["Field Agent", "Legal Officer"]);

        for action in [
            AccessAction::View,
            AccessAction::Download,
            AccessAction::Update,
            AccessAction::Rollback,
            AccessAction::Delete,
        ] {
            assert!(evaluator.evaluate(&roles(&["Field Agent"]), action, &doc).is_allowed());
        }
        assert!(!evaluator
            .evaluate(&roles(&["Collector"]), AccessAction::View, &doc)
            .is_allowed());
    }

    #[test]
    fn test_role_match_ignores_case_and_whitespace() {
        let evaluator = AccessEvaluator::new();
        let doc = document(false, &["Legal Officer"]);
        assert!(evaluator
            .evaluate(&roles(&["  legal officer "]), AccessAction::View, &doc)
            .is_allowed());
    }

    #[test]
    fn test_confidential_requires_privileged_role() {
        let evaluator = AccessEvaluator::new();
        let doc = document(true, &["Field Agent", "Legal Officer"]);

        let verdict = evaluator.evaluate(&roles(&["Field Agent"]), AccessAction::View, &doc);
        assert_eq!(
            verdict.reason(),
            Some("confidential document requires a privileged role")
        );
        assert!(evaluator
            .evaluate(&roles(&["Legal Officer"]), AccessAction::Download, &doc)
            .is_allowed());
    }

    #[test]
    fn test_privileged_role_must_also_be_permitted() {
        let evaluator = AccessEvaluator::new();
        let doc = document(true, &["Legal Officer"]);
        assert!(!evaluator
            .evaluate(&roles(&["Compliance"]), AccessAction::View, &doc)
            .is_allowed());
    }

    #[test]
    fn test_confidential_delete_requires_admin() {
        let evaluator = AccessEvaluator::new();
        let doc = document(true, &["Legal Officer", "Admin"]);

        let denied = evaluator.require(&roles(&["Legal Officer"]), AccessAction::Delete, &doc);
        assert!(denied
            .unwrap_err()
            .is(docvault_core::error::ErrorKind::AccessDenied));
        assert!(evaluator
            .evaluate(&roles(&["admin"]), AccessAction::Delete, &doc)
            .is_allowed());
    }
}
