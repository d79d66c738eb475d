//! External document identifier in the `LDR-YYYYMMDD-NNNN` format.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use docvault_core::AppError;

/// Prefix shared by every document identifier.
pub const DOCUMENT_ID_PREFIX: &str = "LDR";

/// Stable identifier of a document lineage.
///
/// Generated once at upload from the creation date and a per-day sequence
/// allocated by the store. Identifiers are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Build an identifier from a creation date and a 1-based daily sequence.
    pub fn generate(date: NaiveDate, sequence: u32) -> Self {
        Self(format!(
            "{DOCUMENT_ID_PREFIX}-{}-{sequence:04}",
            date.format("%Y%m%d")
        ))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The creation date encoded in the identifier.
    pub fn date(&self) -> Option<NaiveDate> {
        let date_part = self.0.split('-').nth(1)?;
        NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
    }

    /// The daily sequence encoded in the identifier.
    pub fn sequence(&self) -> Option<u32> {
        self.0.rsplit('-').next()?.parse().ok()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AppError::validation(format!(
                "Invalid document id '{s}': expected {DOCUMENT_ID_PREFIX}-YYYYMMDD-NNNN"
            ))
        };

        let mut parts = s.split('-');
        let (Some(prefix), Some(date), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if prefix != DOCUMENT_ID_PREFIX
            || date.len() != 8
            || NaiveDate::parse_from_str(date, "%Y%m%d").is_err()
            || seq.len() < 4
            || !seq.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pads_sequence() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let id = DocumentId::generate(date, 42);
        assert_eq!(id.as_str(), "LDR-20260307-0042");
        assert_eq!(id.date(), Some(date));
        assert_eq!(id.sequence(), Some(42));
    }

    #[test]
    fn test_sequence_past_four_digits() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let id = DocumentId::generate(date, 12_345);
        assert_eq!(id.as_str(), "LDR-20260101-12345");
        assert!(id.as_str().parse::<DocumentId>().is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("LDR-20261015-0001".parse::<DocumentId>().is_ok());
        assert!("DOC-20261015-0001".parse::<DocumentId>().is_err());
        assert!("LDR-20261315-0001".parse::<DocumentId>().is_err());
        assert!("LDR-20261015-01".parse::<DocumentId>().is_err());
        assert!("LDR-20261015-00a1".parse::<DocumentId>().is_err());
        assert!("LDR-20261015-0001-x".parse::<DocumentId>().is_err());
    }
}
