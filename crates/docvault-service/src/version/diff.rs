//! Deterministic comparison of two versions.

use serde::{Deserialize, Serialize};

use docvault_entity::document::{DocumentId, DocumentVersion};

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// First differing byte.
    pub start: u64,
    /// One past the last differing byte.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Structural comparison of two versions of one document.
///
/// Bytes outside the shared prefix and suffix form the changed range in
/// each version. Identical inputs always produce identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDiff {
    /// The compared document.
    pub document_id: DocumentId,
    /// Left-hand version number.
    pub from_version: i32,
    /// Right-hand version number.
    pub to_version: i32,
    /// Whether the content hashes match.
    pub identical: bool,
    /// Left-hand content hash.
    pub from_hash: String,
    /// Right-hand content hash.
    pub to_hash: String,
    /// Left-hand plaintext size.
    pub from_size: u64,
    /// Right-hand plaintext size.
    pub to_size: u64,
    /// `to_size - from_size`.
    pub size_delta: i64,
    /// Left-hand declared format.
    pub from_format: String,
    /// Right-hand declared format.
    pub to_format: String,
    /// Whether the declared formats differ.
    pub format_changed: bool,
    /// Leading bytes shared by both versions.
    pub common_prefix_len: u64,
    /// Trailing bytes shared by both versions, not overlapping the prefix.
    pub common_suffix_len: u64,
    /// Changed bytes in the left-hand version.
    pub from_changed: Option<ByteRange>,
    /// Changed bytes in the right-hand version.
    pub to_changed: Option<ByteRange>,
}

/// Compare two versions and their plaintext content.
pub fn compare(
    from: &DocumentVersion,
    from_content: &[u8],
    to: &DocumentVersion,
    to_content: &[u8],
) -> VersionDiff {
    let prefix = from_content
        .iter()
        .zip(to_content)
        .take_while(|(a, b)| a == b)
        .count();

    let max_suffix = from_content.len().min(to_content.len()) - prefix;
    let suffix = from_content
        .iter()
        .rev()
        .zip(to_content.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let changed = |len: usize| {
        let range = ByteRange {
            start: prefix as u64,
            end: (len - suffix) as u64,
        };
        (!range.is_empty()).then_some(range)
    };

    VersionDiff {
        document_id: from.document_id.clone(),
        from_version: from.version_number,
        to_version: to.version_number,
        identical: from.content_hash == to.content_hash,
        from_hash: from.content_hash.clone(),
        to_hash: to.content_hash.clone(),
        from_size: from_content.len() as u64,
        to_size: to_content.len() as u64,
        size_delta: to_content.len() as i64 - from_content.len() as i64,
        from_format: from.file_format.clone(),
        to_format: to.file_format.clone(),
        format_changed: from.file_format != to.file_format,
        common_prefix_len: prefix as u64,
        common_suffix_len: suffix as u64,
        from_changed: changed(from_content.len()),
        to_changed: changed(to_content.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docvault_crypto::content_hash;

    fn version(n: i32, content: &[u8], format: &str) -> DocumentVersion {
        DocumentVersion {
            document_id: "LDR-20240101-0001".parse().unwrap(),
            version_number: n,
            is_latest_version: false,
            storage_ref: format!("memory://v{n}"),
            content_hash: content_hash(content),
            encrypted: false,
            encryption_key_ref: None,
            file_format: format.into(),
            file_size_bytes: content.len() as i64,
            change_summary: None,
            created_by: "u1".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_middle_edit() {
        let a = b"Notice: pay 1000 by Friday";
        let b = b"Notice: pay 25000 by Friday";
        let diff = compare(
            &version(1, a, "text/plain"),
            a,
            &version(2, b, "text/plain"),
            b,
        );

        assert!(!diff.identical);
        assert_eq!(diff.common_prefix_len, 12);
        assert_eq!(diff.common_suffix_len, 13);
        assert_eq!(diff.from_changed, Some(ByteRange { start: 12, end: 13 }));
        assert_eq!(diff.to_changed, Some(ByteRange { start: 12, end: 14 }));
        assert_eq!(diff.size_delta, 1);
        assert!(!diff.format_changed);
    }

    #[test]
    fn test_identical_content() {
        let a = b"same bytes";
        let diff = compare(&version(1, a, "application/pdf"), a, &version(3, a, "application/pdf"), a);
        assert!(diff.identical);
        assert_eq!(diff.from_changed, None);
        assert_eq!(diff.to_changed, None);
        assert_eq!(diff.common_prefix_len, a.len() as u64);
        assert_eq!(diff.common_suffix_len, 0);
    }

    #[test]
    fn test_append_only_change() {
        let a = b"abc";
        let b = b"abcdef";
        let diff = compare(&version(1, a, "text/plain"), a, &version(2, b, "text/csv"), b);
        assert_eq!(diff.from_changed, None);
        assert_eq!(diff.to_changed, Some(ByteRange { start: 3, end: 6 }));
        assert!(diff.format_changed);
    }

    #[test]
    fn test_deterministic() {
        let a = b"x1y";
        let b = b"x22y";
        let first = compare(&version(1, a, "t"), a, &version(2, b, "t"), b);
        let second = compare(&version(1, a, "t"), a, &version(2, b, "t"), b);
        assert_eq!(first.common_prefix_len, second.common_prefix_len);
        assert_eq!(first.to_changed, second.to_changed);
        assert_eq!(first.from_hash, second.from_hash);
    }
}
