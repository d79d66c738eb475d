//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::{BackendKind, DeleteOutcome, StorageProvider};
use docvault_database::MemoryStore;
use docvault_entity::document::{DocumentType, LinkedEntityType};
use docvault_service::{DocVault, RequestContext, Stores, UploadRequest, VaultSettings};
use docvault_storage::StorageManager;
use docvault_storage::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Master secret used by every test vault.
pub const TEST_MASTER_KEY: [u8; 32] = [42u8; 32];

/// Largest upload accepted by test vaults.
pub const TEST_MAX_UPLOAD: u64 = 1024 * 1024;

/// Object backend that stores blobs but refuses to delete them.
#[derive(Debug, Default)]
pub struct UndeletableObjectStore {
    inner: MemoryStorageProvider,
}

#[async_trait]
impl StorageProvider for UndeletableObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Object
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read(&self, key: &str) -> AppResult<Bytes> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.inner.write(key, data).await
    }

    async fn delete(&self, _key: &str) -> AppResult<DeleteOutcome> {
        Err(AppError::storage("object store rejected the delete request"))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }
}

/// A fully wired vault over in-memory stores and temporary local storage.
pub struct TestApp {
    /// The service graph.
    pub vault: DocVault,
    /// Backing store for documents, keys and the access log.
    pub store: Arc<MemoryStore>,
    /// In-memory blob backend registered as `memory`.
    pub memory: Arc<MemoryStorageProvider>,
    /// Root of the `local` backend; removed on drop.
    pub root: TempDir,
}

impl TestApp {
    /// Vault writing to the local backend, encrypting confidential documents only.
    pub async fn new() -> Self {
        Self::build("local", false).await
    }

    /// Vault writing to the in-memory backend.
    pub async fn in_memory() -> Self {
        Self::build("memory", false).await
    }

    /// Vault that encrypts every document.
    pub async fn encrypt_all() -> Self {
        Self::build("local", true).await
    }

    async fn build(default_backend: &str, encrypt_all: bool) -> Self {
        let root = TempDir::new().expect("Failed to create storage root");
        let root_path = root.path().to_str().expect("Non UTF-8 temp path").to_string();

        let storage = StorageManager::new(Duration::from_secs(5));
        let local = LocalStorageProvider::new(&root_path)
            .await
            .expect("Failed to init local storage");
        storage.register("local", Arc::new(local), false).await;
        let memory = Arc::new(MemoryStorageProvider::new());
        storage.register("memory", memory.clone(), false).await;
        storage
            .register("s3", Arc::new(UndeletableObjectStore::default()), false)
            .await;
        storage
            .set_default(default_backend)
            .await
            .expect("Failed to set default backend");

        let store = Arc::new(MemoryStore::new());
        let crypto = Arc::new(docvault_crypto::CryptoEngine::new(TEST_MASTER_KEY.to_vec()));
        let vault = DocVault::new(
            Stores::memory(store.clone()),
            crypto,
            storage,
            VaultSettings {
                encrypt_all,
                max_upload_size: TEST_MAX_UPLOAD,
            },
        );

        Self {
            vault,
            store,
            memory,
            root,
        }
    }
}

/// A legal officer.
pub fn legal_officer(actor: &str) -> RequestContext {
    RequestContext::new(actor, ["Legal Officer"])
}

/// An administrator.
pub fn admin(actor: &str) -> RequestContext {
    RequestContext::new(actor, ["Admin"])
}

/// A collector with no privileged role.
pub fn collector(actor: &str) -> RequestContext {
    RequestContext::new(actor, ["Collector"])
}

/// An upload request with sensible defaults.
pub fn upload_request(name: &str, content: &[u8], confidential: bool) -> UploadRequest {
    UploadRequest {
        linked_entity_type: LinkedEntityType::LoanAccount,
        linked_entity_id: "LA-1001".to_string(),
        document_name: name.to_string(),
        document_type: DocumentType::LegalNotice,
        confidential,
        access_permissions: vec![
            "Legal Officer".to_string(),
            "Admin".to_string(),
            "Collector".to_string(),
        ],
        file_format: "application/pdf".to_string(),
        content: Bytes::copy_from_slice(content),
    }
}
