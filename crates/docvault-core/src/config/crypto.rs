//! Encryption-at-rest configuration.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum decoded length of the master secret.
pub const MIN_MASTER_KEY_BYTES: usize = 32;

/// Encryption settings for stored document content.
#[derive(Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Base64-encoded master secret from which per-document keys are derived.
    pub master_key: String,
    /// Encrypt non-confidential documents as well.
    #[serde(default)]
    pub encrypt_all: bool,
}

impl CryptoConfig {
    /// Decode the master secret, rejecting anything shorter than 32 bytes.
    pub fn master_key_bytes(&self) -> Result<Vec<u8>, AppError> {
        let bytes = STANDARD
            .decode(self.master_key.trim())
            .map_err(|e| AppError::configuration(format!("crypto.master_key is not base64: {e}")))?;
        if bytes.len() < MIN_MASTER_KEY_BYTES {
            return Err(AppError::configuration(format!(
                "crypto.master_key must decode to at least {MIN_MASTER_KEY_BYTES} bytes (got {})",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

impl std::fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoConfig")
            .field("master_key", &"<redacted>")
            .field("encrypt_all", &self.encrypt_all)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_decodes() {
        let config = CryptoConfig {
            master_key: STANDARD.encode([7u8; 32]),
            encrypt_all: false,
        };
        assert_eq!(config.master_key_bytes().unwrap(), vec![7u8; 32]);
    }

    #[test]
    fn test_short_master_key_rejected() {
        let config = CryptoConfig {
            master_key: STANDARD.encode([1u8; 16]),
            encrypt_all: false,
        };
        assert!(config.master_key_bytes().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = CryptoConfig {
            master_key: "c2VjcmV0".to_string(),
            encrypt_all: true,
        };
        assert!(!format!("{config:?}").contains("c2VjcmV0"));
    }
}
