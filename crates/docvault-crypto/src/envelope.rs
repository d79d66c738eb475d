//! Sealed payload layout.
//!
//! On storage a sealed blob is framed as
//! `MAGIC (4) || iv (12) || tag (16) || ciphertext`.

use bytes::{BufMut, Bytes, BytesMut};

use docvault_core::error::AppError;

/// Marks a blob as a sealed envelope, version 1.
pub const MAGIC: &[u8; 4] = b"DVS1";
/// AES-GCM nonce length.
pub const IV_LEN: usize = 12;
/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;
/// Total framing overhead.
pub const HEADER_LEN: usize = MAGIC.len() + IV_LEN + TAG_LEN;

/// Output of an authenticated encryption.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// Encrypted content, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Per-encryption random nonce.
    pub iv: [u8; IV_LEN],
    /// GCM authentication tag.
    pub auth_tag: [u8; TAG_LEN],
}

impl SealedPayload {
    /// Frame the payload for storage.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.ciphertext.len());
        buf.put_slice(MAGIC);
        buf.put_slice(&self.iv);
        buf.put_slice(&self.auth_tag);
        buf.put_slice(&self.ciphertext);
        buf.freeze()
    }

    /// Parse a stored blob.
    ///
    /// Anything that is not a well-formed envelope is treated as tampering.
    pub fn from_bytes(data: &[u8]) -> Result<Self, AppError> {
        if data.len() < HEADER_LEN {
            return Err(AppError::integrity(format!(
                "Sealed blob too short: {} bytes",
                data.len()
            )));
        }
        if &data[..MAGIC.len()] != MAGIC {
            return Err(AppError::integrity("Sealed blob has an unknown header"));
        }

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&data[MAGIC.len()..MAGIC.len() + IV_LEN]);
        let mut auth_tag = [0u8; TAG_LEN];
        auth_tag.copy_from_slice(&data[MAGIC.len() + IV_LEN..HEADER_LEN]);

        Ok(Self {
            ciphertext: data[HEADER_LEN..].to_vec(),
            iv,
            auth_tag,
        })
    }
}

impl std::fmt::Debug for SealedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedPayload")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv", &hex::encode(self.iv))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_layout() {
        let payload = SealedPayload {
            ciphertext: vec![9, 9, 9],
            iv: [1; IV_LEN],
            auth_tag: [2; TAG_LEN],
        };
        let bytes = payload.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 3);
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(SealedPayload::from_bytes(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_rejects_short_or_foreign_blobs() {
        assert!(SealedPayload::from_bytes(b"DVS1").is_err());
        let mut foreign = vec![0u8; HEADER_LEN + 8];
        foreign[..4].copy_from_slice(b"%PDF");
        assert!(SealedPayload::from_bytes(&foreign).is_err());
    }
}
