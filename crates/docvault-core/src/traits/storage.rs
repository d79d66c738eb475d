//! Storage provider trait for pluggable blob storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// The physical class of a backend, used to aggregate cleanup reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Filesystem attached to the host.
    Local,
    /// Remote object storage (S3 and compatible).
    Object,
}

/// Result of deleting a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The object existed and was removed.
    Deleted,
    /// Nothing was stored under the key.
    NotFound,
}

/// Trait for blob storage backends.
///
/// Implementations exist for the local filesystem, S3 and an in-memory
/// object store. Keys are backend-relative; the backend tag that makes a
/// stored reference self-describing lives in `StorageRef`, not here.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Return whether this provider is local or remote object storage.
    fn kind(&self) -> BackendKind;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object into memory.
    ///
    /// A missing object is reported as a `NotFound` error.
    async fn read(&self, key: &str) -> AppResult<Bytes>;

    /// Write an object, replacing any previous content under the key.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Delete an object. Missing objects yield [`DeleteOutcome::NotFound`].
    async fn delete(&self, key: &str) -> AppResult<DeleteOutcome>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
