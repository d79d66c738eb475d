//! AES-256-GCM encryption bound to key references.

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, Nonce, OsRng, Tag};
use aes_gcm::Aes256Gcm;
use bytes::Bytes;
use tracing::warn;

use docvault_core::error::AppError;
use docvault_entity::key::EncryptionKey;

use crate::digest;
use crate::envelope::{IV_LEN, SealedPayload, TAG_LEN};
use crate::keyring::KeyRing;

/// Encrypts, decrypts and hashes document content.
///
/// The engine exclusively owns key derivation; callers only ever hold key
/// references. The key reference is bound into every ciphertext as
/// associated data, so a blob cannot be opened under a different reference.
#[derive(Debug)]
pub struct CryptoEngine {
    /// Registered key descriptors and derived keys.
    keyring: KeyRing,
}

impl CryptoEngine {
    /// Create an engine over the decoded master secret.
    pub fn new(master_key: Vec<u8>) -> Self {
        Self {
            keyring: KeyRing::new(master_key),
        }
    }

    /// Issue a new key descriptor for a document.
    pub fn issue_key(&self) -> EncryptionKey {
        self.keyring.issue()
    }

    /// Register a persisted key descriptor.
    pub fn register_key(&self, key: EncryptionKey) -> Result<(), AppError> {
        self.keyring.register(key)
    }

    /// Whether `key_ref` is known to this engine.
    pub fn has_key(&self, key_ref: &str) -> bool {
        self.keyring.contains(key_ref)
    }

    /// Hash plaintext content.
    pub fn digest(&self, plaintext: &[u8]) -> String {
        digest::content_hash(plaintext)
    }

    /// Encrypt `plaintext` under the key identified by `key_ref`.
    pub fn encrypt(&self, plaintext: &[u8], key_ref: &str) -> Result<SealedPayload, AppError> {
        let cipher = self.cipher(key_ref)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(&nonce, key_ref.as_bytes(), &mut buffer)
            .map_err(|e| AppError::crypto(format!("Encryption failed: {e}")))?;

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(nonce.as_slice());
        let mut auth_tag = [0u8; TAG_LEN];
        auth_tag.copy_from_slice(tag.as_slice());

        Ok(SealedPayload {
            ciphertext: buffer,
            iv,
            auth_tag,
        })
    }

    /// Decrypt and authenticate a payload.
    ///
    /// Fails closed: any authentication failure is an `Integrity` error and
    /// no plaintext is returned.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        iv: &[u8],
        auth_tag: &[u8],
        key_ref: &str,
    ) -> Result<Vec<u8>, AppError> {
        if iv.len() != IV_LEN || auth_tag.len() != TAG_LEN {
            return Err(AppError::integrity(format!(
                "Malformed IV ({} bytes) or tag ({} bytes)",
                iv.len(),
                auth_tag.len()
            )));
        }

        let cipher = self.cipher(key_ref)?;
        let nonce = Nonce::<Aes256Gcm>::from_slice(iv);
        let tag = Tag::<Aes256Gcm>::from_slice(auth_tag);

        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(nonce, key_ref.as_bytes(), &mut buffer, tag)
            .map_err(|_| {
                warn!(key_ref, "Ciphertext failed authentication");
                AppError::integrity("Ciphertext failed authentication")
            })?;

        Ok(buffer)
    }

    /// Encrypt and frame content for storage.
    pub fn seal(&self, plaintext: &[u8], key_ref: &str) -> Result<Bytes, AppError> {
        Ok(self.encrypt(plaintext, key_ref)?.to_bytes())
    }

    /// Parse a framed blob and decrypt it.
    pub fn open(&self, sealed: &[u8], key_ref: &str) -> Result<Vec<u8>, AppError> {
        let payload = SealedPayload::from_bytes(sealed)?;
        self.decrypt(&payload.ciphertext, &payload.iv, &payload.auth_tag, key_ref)
    }

    fn cipher(&self, key_ref: &str) -> Result<Aes256Gcm, AppError> {
        let key = self.keyring.data_key(key_ref)?;
        Aes256Gcm::new_from_slice(&key[..])
            .map_err(|e| AppError::crypto(format!("Malformed key material for {key_ref}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::error::ErrorKind;

    fn engine_with_key() -> (CryptoEngine, String) {
        let engine = CryptoEngine::new(vec![0x42; 32]);
        let key = engine.issue_key();
        (engine, key.key_ref)
    }

    #[test]
    fn test_round_trip() {
        let (engine, key_ref) = engine_with_key();
        for plaintext in [&b""[..], b"x", b"Court order #2291, sealed"] {
            let sealed = engine.encrypt(plaintext, &key_ref).unwrap();
            let opened = engine
                .decrypt(&sealed.ciphertext, &sealed.iv, &sealed.auth_tag, &key_ref)
                .unwrap();
            assert_eq!(opened, plaintext);
        }
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let (engine, key_ref) = engine_with_key();
        let a = engine.encrypt(b"same", &key_ref).unwrap();
        let b = engine.encrypt(b"same", &key_ref).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_tampered_ciphertext_fails_closed() {
        let (engine, key_ref) = engine_with_key();
        let mut sealed = engine.encrypt(b"privileged memo", &key_ref).unwrap();
        sealed.ciphertext[3] ^= 0x01;
        let err = engine
            .decrypt(&sealed.ciphertext, &sealed.iv, &sealed.auth_tag, &key_ref)
            .unwrap_err();
        assert!(err.is(ErrorKind::Integrity));
    }

    #[test]
    fn test_tampered_tag_fails_closed() {
        let (engine, key_ref) = engine_with_key();
        let mut sealed = engine.encrypt(b"privileged memo", &key_ref).unwrap();
        sealed.auth_tag[0] ^= 0x80;
        let err = engine
            .decrypt(&sealed.ciphertext, &sealed.iv, &sealed.auth_tag, &key_ref)
            .unwrap_err();
        assert!(err.is(ErrorKind::Integrity));
    }

    #[test]
    fn test_wrong_key_ref_fails_closed() {
        let engine = CryptoEngine::new(vec![0x42; 32]);
        let a = engine.issue_key().key_ref;
        let b = engine.issue_key().key_ref;
        let sealed = engine.seal(b"memo", &a).unwrap();
        assert!(engine.open(&sealed, &b).unwrap_err().is(ErrorKind::Integrity));
    }

    #[test]
    fn test_missing_key_is_crypto_error() {
        let engine = CryptoEngine::new(vec![0x42; 32]);
        let err = engine.encrypt(b"memo", "key-unknown").unwrap_err();
        assert!(err.is(ErrorKind::Crypto));
    }

    #[test]
    fn test_short_iv_rejected() {
        let (engine, key_ref) = engine_with_key();
        let sealed = engine.encrypt(b"memo", &key_ref).unwrap();
        let err = engine
            .decrypt(&sealed.ciphertext, &sealed.iv[..8], &sealed.auth_tag, &key_ref)
            .unwrap_err();
        assert!(err.is(ErrorKind::Integrity));
    }

    #[test]
    fn test_seal_open_framing() {
        let (engine, key_ref) = engine_with_key();
        let sealed = engine.seal(b"framed", &key_ref).unwrap();
        assert_eq!(engine.open(&sealed, &key_ref).unwrap(), b"framed");
    }
}
