//! Role sets that gate confidential documents.

use serde::{Deserialize, Serialize};

/// Role allowed to act on confidential documents.
pub const LEGAL_OFFICER: &str = "Legal Officer";
/// Administrator role; the only role that may delete confidential documents.
pub const ADMIN: &str = "Admin";
/// Compliance reviewer role.
pub const COMPLIANCE: &str = "Compliance";

/// Which roles count as privileged, and which role may delete confidential
/// documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Roles that may act on confidential documents.
    pub privileged_roles: Vec<String>,
    /// Role additionally required to delete a confidential document.
    pub confidential_delete_role: String,
}

impl AccessPolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self {
            privileged_roles: vec![
                LEGAL_OFFICER.to_string(),
                ADMIN.to_string(),
                COMPLIANCE.to_string(),
            ],
            confidential_delete_role: ADMIN.to_string(),
        }
    }

    /// Whether `role` is privileged.
    pub fn is_privileged(&self, role: &str) -> bool {
        self.privileged_roles.iter().any(|p| role_eq(p, role))
    }

    /// Whether `role` may delete confidential documents.
    pub fn may_delete_confidential(&self, role: &str) -> bool {
        role_eq(&self.confidential_delete_role, role)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare role names ignoring case and surrounding whitespace.
pub fn role_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
