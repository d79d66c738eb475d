//! SHA-256 content digests.

use sha2::{Digest, Sha256};

use docvault_core::error::AppError;

/// Hash plaintext content, returning lower-case hex.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Recompute the digest of `data` and compare it with `expected`.
///
/// A mismatch is an integrity failure; the caller must not hand the
/// content out.
pub fn verify_hash(data: &[u8], expected: &str) -> Result<(), AppError> {
    let actual = content_hash(data);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(AppError::integrity(format!(
            "Content hash mismatch: expected {expected}, computed {actual}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_detects_change() {
        let hash = content_hash(b"settlement agreement v1");
        assert!(verify_hash(b"settlement agreement v1", &hash).is_ok());
        let err = verify_hash(b"settlement agreement v2", &hash).unwrap_err();
        assert!(err.is(docvault_core::error::ErrorKind::Integrity));
    }
}
