//! Actions recorded in the access log and the decisions taken on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use docvault_core::AppError;

/// An action an actor attempts on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_action", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessAction {
    /// Read metadata, list versions, or read content inline.
    View,
    /// Read content for export.
    Download,
    /// Upload, add a version, or change access settings.
    Update,
    /// Remove the document and its stored versions.
    Delete,
    /// Re-publish an earlier version as the newest one.
    Rollback,
}

impl AccessAction {
    /// Return the action as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Download => "DOWNLOAD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Rollback => "ROLLBACK",
        }
    }
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VIEW" => Ok(Self::View),
            "DOWNLOAD" => Ok(Self::Download),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            "ROLLBACK" => Ok(Self::Rollback),
            _ => Err(AppError::validation(format!(
                "Invalid access action: '{s}'. Expected one of: VIEW, DOWNLOAD, UPDATE, DELETE, ROLLBACK"
            ))),
        }
    }
}

/// Outcome of an access evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_decision", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessDecision {
    /// The actor was authorized.
    Allowed,
    /// The actor was refused.
    Denied,
}

impl AccessDecision {
    /// Return the decision as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::Denied => "DENIED",
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessDecision {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALLOWED" => Ok(Self::Allowed),
            "DENIED" => Ok(Self::Denied),
            _ => Err(AppError::validation(format!("Invalid access decision: '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!("rollback".parse::<AccessAction>().unwrap(), AccessAction::Rollback);
        assert_eq!(" View ".parse::<AccessAction>().unwrap(), AccessAction::View);
        assert!("approve".parse::<AccessAction>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase() {
        let json = serde_json::to_string(&AccessDecision::Denied).unwrap();
        assert_eq!(json, "\"DENIED\"");
        let action: AccessAction = serde_json::from_str("\"DOWNLOAD\"").unwrap();
        assert_eq!(action, AccessAction::Download);
    }
}
