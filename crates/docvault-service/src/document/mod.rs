//! Document lifecycle: upload, retrieval, updates, access settings and deletion.

pub mod outcome;
pub mod request;
pub mod service;

pub use outcome::{
    BulkUploadFailure, BulkUploadResult, CleanupReport, DeletionOutcome, RetrievedDocument,
    UploadOutcome,
};
pub use request::{AccessSettingsUpdate, UpdateRequest, UploadRequest};
pub use service::{DOCUMENT_NOT_FOUND, DocumentService};
