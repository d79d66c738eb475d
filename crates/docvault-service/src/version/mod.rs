//! Version control: append-only version chains, rollback and diff.

pub mod diff;
pub mod engine;

pub use diff::{ByteRange, VersionDiff};
pub use engine::{CommittedVersion, INTEGRITY_ALERT_TARGET, StagedContent, VersionEngine};
