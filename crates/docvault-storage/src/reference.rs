//! Backend-tagged storage references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use docvault_core::error::AppError;

const SEPARATOR: &str = "://";

/// Location of one stored blob: the backend tag plus a backend-relative key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageRef {
    backend: String,
    key: String,
}

impl StorageRef {
    /// Build a reference, validating both halves.
    pub fn new(backend: impl Into<String>, key: impl Into<String>) -> Result<Self, AppError> {
        let backend = backend.into();
        let key = key.into();

        if backend.is_empty()
            || !backend
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(AppError::validation(format!(
                "Invalid storage backend tag: '{backend}'"
            )));
        }
        if key.is_empty() {
            return Err(AppError::validation("Storage key must not be empty"));
        }

        Ok(Self { backend, key })
    }

    /// Backend tag, e.g. `local` or `s3`.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Backend-relative key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.backend, self.key)
    }
}

impl FromStr for StorageRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (backend, key) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| AppError::validation(format!("Malformed storage reference: '{s}'")))?;
        Self::new(backend, key)
    }
}

impl TryFrom<String> for StorageRef {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StorageRef> for String {
    fn from(value: StorageRef) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let r: StorageRef = "s3://documents/LDR-20240101-0001/v1-abc.bin".parse().unwrap();
        assert_eq!(r.backend(), "s3");
        assert_eq!(r.key(), "documents/LDR-20240101-0001/v1-abc.bin");
        assert_eq!(r.to_string(), "s3://documents/LDR-20240101-0001/v1-abc.bin");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("documents/no-scheme".parse::<StorageRef>().is_err());
        assert!("://key".parse::<StorageRef>().is_err());
        assert!("local://".parse::<StorageRef>().is_err());
        assert!("Local://key".parse::<StorageRef>().is_err());
    }
}
