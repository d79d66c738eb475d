//! Storage manager: routes operations to the correct provider by backend tag.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use docvault_core::config::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::{BackendKind, DeleteOutcome, StorageProvider};

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};
use crate::reference::StorageRef;

/// Central storage manager that holds references to all registered providers.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// Map of backend tag → provider instance.
    providers: Arc<RwLock<HashMap<String, Arc<dyn StorageProvider>>>>,
    /// Backend that receives new writes.
    default_backend: Arc<RwLock<Option<String>>>,
    /// Upper bound for any single provider call.
    timeout: Duration,
}

impl StorageManager {
    /// Create a new empty storage manager.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
            default_backend: Arc::new(RwLock::new(None)),
            timeout,
        }
    }

    /// Build a manager with every backend enabled in the configuration.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let manager = Self::new(Duration::from_secs(config.operation_timeout_seconds));

        let local = LocalStorageProvider::new(&config.local.root_path).await?;
        manager.register("local", Arc::new(local), false).await;
        manager
            .register("memory", Arc::new(MemoryStorageProvider::new()), false)
            .await;

        if config.s3.enabled {
            #[cfg(feature = "s3")]
            {
                let s3 = crate::providers::S3StorageProvider::new(&config.s3).await?;
                manager.register("s3", Arc::new(s3), false).await;
            }
            #[cfg(not(feature = "s3"))]
            return Err(AppError::configuration(
                "S3 storage is enabled but this build lacks the `s3` feature",
            ));
        }

        manager.set_default(&config.default_backend).await?;
        Ok(manager)
    }

    /// Register a storage provider under a backend tag.
    pub async fn register(
        &self,
        backend: impl Into<String>,
        provider: Arc<dyn StorageProvider>,
        is_default: bool,
    ) {
        let backend = backend.into();
        info!(backend = %backend, provider = provider.provider_type(), "Registered storage backend");
        let mut providers = self.providers.write().await;
        providers.insert(backend.clone(), provider);
        if is_default {
            let mut default = self.default_backend.write().await;
            *default = Some(backend);
        }
    }

    /// Switch the backend used for new writes.
    ///
    /// Existing references keep resolving through their own tags.
    pub async fn set_default(&self, backend: &str) -> AppResult<()> {
        if !self.providers.read().await.contains_key(backend) {
            return Err(AppError::configuration(format!(
                "Storage backend '{backend}' is not registered"
            )));
        }
        let mut default = self.default_backend.write().await;
        *default = Some(backend.to_string());
        info!(backend, "Default storage backend set");
        Ok(())
    }

    /// Get a provider by backend tag.
    pub async fn get(&self, backend: &str) -> AppResult<Arc<dyn StorageProvider>> {
        let providers = self.providers.read().await;
        providers
            .get(backend)
            .cloned()
            .ok_or_else(|| AppError::storage(format!("Storage backend '{backend}' is not registered")))
    }

    /// Get the default backend tag and provider.
    pub async fn get_default(&self) -> AppResult<(String, Arc<dyn StorageProvider>)> {
        let backend = {
            let default = self.default_backend.read().await;
            default
                .clone()
                .ok_or_else(|| AppError::configuration("No default storage configured"))?
        };
        let provider = self.get(&backend).await?;
        Ok((backend, provider))
    }

    /// Write a blob to the default backend.
    pub async fn write(&self, key: &str, data: Bytes) -> AppResult<StorageRef> {
        let (backend, provider) = self.get_default().await?;
        let size = data.len();
        self.bounded("write", &backend, provider.write(key, data))
            .await?;
        debug!(backend = %backend, key, bytes = size, "Stored blob");
        StorageRef::new(backend, key)
    }

    /// Read the blob behind a reference.
    pub async fn read(&self, reference: &StorageRef) -> AppResult<Bytes> {
        let provider = self.get(reference.backend()).await?;
        self.bounded("read", reference.backend(), provider.read(reference.key()))
            .await
    }

    /// Delete the blob behind a reference.
    ///
    /// Returns the class of the backend that held it so callers can
    /// aggregate local and remote cleanup separately.
    pub async fn delete(&self, reference: &StorageRef) -> AppResult<(BackendKind, DeleteOutcome)> {
        let provider = self.get(reference.backend()).await?;
        let outcome = self
            .bounded("delete", reference.backend(), provider.delete(reference.key()))
            .await?;
        Ok((provider.kind(), outcome))
    }

    /// Check whether the blob behind a reference exists.
    pub async fn exists(&self, reference: &StorageRef) -> AppResult<bool> {
        let provider = self.get(reference.backend()).await?;
        self.bounded("exists", reference.backend(), provider.exists(reference.key()))
            .await
    }

    /// Check health of all registered providers concurrently.
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let providers: Vec<(String, Arc<dyn StorageProvider>)> = {
            let guard = self.providers.read().await;
            guard.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };

        let checks = providers.into_iter().map(|(backend, provider)| async move {
            let healthy = self
                .bounded("health_check", &backend, provider.health_check())
                .await
                .unwrap_or(false);
            (backend, healthy)
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Run a provider call under the configured timeout.
    async fn bounded<T>(
        &self,
        op: &str,
        backend: &str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, backend, timeout_ms = self.timeout.as_millis() as u64, "Storage call timed out");
                Err(AppError::storage(format!(
                    "Storage {op} on '{backend}' timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docvault_core::error::ErrorKind;

    #[derive(Debug)]
    struct StalledProvider;

    #[async_trait]
    impl StorageProvider for StalledProvider {
        fn provider_type(&self) -> &str {
            "stalled"
        }
        fn kind(&self) -> BackendKind {
            BackendKind::Object
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
        async fn read(&self, _key: &str) -> AppResult<Bytes> {
            std::future::pending().await
        }
        async fn write(&self, _key: &str, _data: Bytes) -> AppResult<()> {
            std::future::pending().await
        }
        async fn delete(&self, _key: &str) -> AppResult<DeleteOutcome> {
            std::future::pending().await
        }
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_writes_follow_default_and_reads_follow_tag() {
        let manager = StorageManager::new(Duration::from_secs(5));
        manager
            .register("local", Arc::new(MemoryStorageProvider::new()), true)
            .await;
        manager
            .register("s3", Arc::new(MemoryStorageProvider::new()), false)
            .await;

        let first = manager.write("a.bin", Bytes::from_static(b"one")).await.unwrap();
        manager.set_default("s3").await.unwrap();
        let second = manager.write("b.bin", Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(first.to_string(), "local://a.bin");
        assert_eq!(second.to_string(), "s3://b.bin");
        assert_eq!(manager.read(&first).await.unwrap(), Bytes::from_static(b"one"));
        assert_eq!(manager.read(&second).await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let manager = StorageManager::new(Duration::from_secs(5));
        assert!(manager.set_default("nfs").await.is_err());
        let reference: StorageRef = "nfs://x".parse().unwrap();
        let err = manager.read(&reference).await.unwrap_err();
        assert!(err.is(ErrorKind::Storage));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retryable_storage_error() {
        let manager = StorageManager::new(Duration::from_millis(50));
        manager.register("s3", Arc::new(StalledProvider), true).await;

        let err = manager
            .write("x.bin", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Storage));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_delete_reports_kind_and_outcome() {
        let manager = StorageManager::new(Duration::from_secs(5));
        manager
            .register("memory", Arc::new(MemoryStorageProvider::new()), true)
            .await;
        let r = manager.write("k", Bytes::from_static(b"v")).await.unwrap();

        assert_eq!(
            manager.delete(&r).await.unwrap(),
            (BackendKind::Object, DeleteOutcome::Deleted)
        );
        assert_eq!(
            manager.delete(&r).await.unwrap(),
            (BackendKind::Object, DeleteOutcome::NotFound)
        );
    }
}
