//! Encryption key descriptor entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Describes how a data key is derived; never holds the key itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EncryptionKey {
    /// Reference stored on documents and versions.
    pub key_ref: String,
    /// Cipher the derived key is used with.
    pub algorithm: String,
    /// Random salt mixed into key derivation.
    pub salt: Vec<u8>,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
}
