//! # docvault-service
//!
//! Business logic for DocVault. The [`DocumentService`] orchestrates the
//! access evaluator, the version engine, blob storage and the audit
//! logger to implement every document operation.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod app;
pub mod audit;
pub mod context;
pub mod document;
pub mod lock;
pub mod version;

pub use app::{DocVault, Stores, VaultSettings};
pub use audit::AuditLogger;
pub use context::RequestContext;
pub use document::{
    AccessSettingsUpdate, BulkUploadFailure, BulkUploadResult, CleanupReport, DeletionOutcome,
    DocumentService, RetrievedDocument, UpdateRequest, UploadOutcome, UploadRequest,
};
pub use lock::DocumentLocks;
pub use version::{CommittedVersion, VersionDiff, VersionEngine};
