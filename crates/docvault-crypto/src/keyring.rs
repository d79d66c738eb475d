//! Key descriptors and data-key derivation.
//!
//! A data key is never stored. It is re-derived with Argon2id from the
//! configured master secret and the salt carried by the key descriptor,
//! then cached for the lifetime of the process.

use argon2::{Algorithm, Argon2, Params, Version};
use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use docvault_core::error::AppError;
use docvault_entity::key::EncryptionKey;

/// Algorithm label recorded on every descriptor this ring issues.
pub const KEY_ALGORITHM: &str = "AES-256-GCM";
/// Length of the random salt in each descriptor.
pub const SALT_LEN: usize = 16;
/// Length of a derived data key.
pub const DATA_KEY_LEN: usize = 32;
/// Shortest salt Argon2 accepts.
const MIN_SALT_LEN: usize = 8;

// The master secret is random key material, not a passphrase.
const KDF_MEMORY_KIB: u32 = 4096;
const KDF_ITERATIONS: u32 = 1;
const KDF_LANES: u32 = 1;

/// Registry of known key descriptors and their derived data keys.
pub struct KeyRing {
    /// Master secret (zeroized on drop).
    master: Zeroizing<Vec<u8>>,
    /// Descriptors by key ref.
    descriptors: DashMap<String, EncryptionKey>,
    /// Derived keys by key ref.
    derived: DashMap<String, Zeroizing<[u8; DATA_KEY_LEN]>>,
}

impl KeyRing {
    /// Create a key ring over the given master secret.
    pub fn new(master: Vec<u8>) -> Self {
        Self {
            master: Zeroizing::new(master),
            descriptors: DashMap::new(),
            derived: DashMap::new(),
        }
    }

    /// Issue a fresh descriptor with a random salt and register it.
    pub fn issue(&self) -> EncryptionKey {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let key = EncryptionKey {
            key_ref: format!("key-{}", Uuid::new_v4()),
            algorithm: KEY_ALGORITHM.to_string(),
            salt,
            created_at: Utc::now(),
        };

        debug!(key_ref = %key.key_ref, "Issued encryption key");
        self.descriptors.insert(key.key_ref.clone(), key.clone());
        key
    }

    /// Register a descriptor loaded from persistent storage.
    pub fn register(&self, key: EncryptionKey) -> Result<(), AppError> {
        if key.algorithm != KEY_ALGORITHM {
            return Err(AppError::crypto(format!(
                "Unsupported key algorithm '{}' for {}",
                key.algorithm, key.key_ref
            )));
        }
        if key.salt.len() < MIN_SALT_LEN {
            return Err(AppError::crypto(format!(
                "Key {} has a malformed salt ({} bytes)",
                key.key_ref,
                key.salt.len()
            )));
        }
        self.descriptors.insert(key.key_ref.clone(), key);
        Ok(())
    }

    /// Whether a descriptor is registered under `key_ref`.
    pub fn contains(&self, key_ref: &str) -> bool {
        self.descriptors.contains_key(key_ref)
    }

    /// Return the data key for `key_ref`, deriving it on first use.
    pub fn data_key(&self, key_ref: &str) -> Result<Zeroizing<[u8; DATA_KEY_LEN]>, AppError> {
        if let Some(cached) = self.derived.get(key_ref) {
            return Ok(cached.value().clone());
        }

        let descriptor = self
            .descriptors
            .get(key_ref)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::crypto(format!("Unknown encryption key ref '{key_ref}'")))?;

        let derived = self.derive(&descriptor)?;
        self.derived.insert(key_ref.to_string(), derived.clone());
        Ok(derived)
    }

    fn derive(&self, key: &EncryptionKey) -> Result<Zeroizing<[u8; DATA_KEY_LEN]>, AppError> {
        let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_LANES, Some(DATA_KEY_LEN))
            .map_err(|e| AppError::crypto(format!("Invalid key derivation parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = Zeroizing::new([0u8; DATA_KEY_LEN]);
        argon2
            .hash_password_into(&self.master, &key.salt, &mut out[..])
            .map_err(|e| AppError::crypto(format!("Key derivation failed for {}: {e}", key.key_ref)))?;
        Ok(out)
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("keys", &self.descriptors.len())
            .finish()
    }
}
