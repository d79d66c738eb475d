//! Composition root that wires stores, crypto and storage into services.

use std::sync::Arc;

use docvault_auth::AccessEvaluator;
use docvault_crypto::CryptoEngine;
use docvault_database::{AccessLogStore, DocumentStore, KeyStore, MemoryStore};
use docvault_storage::StorageManager;

use crate::audit::AuditLogger;
use crate::document::DocumentService;
use crate::lock::DocumentLocks;
use crate::version::VersionEngine;

/// Persistence handles the services depend on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Documents and version chains.
    pub documents: Arc<dyn DocumentStore>,
    /// Encryption key descriptors.
    pub keys: Arc<dyn KeyStore>,
    /// Append-only access log.
    pub access_log: Arc<dyn AccessLogStore>,
}

impl Stores {
    /// Back every store with one in-memory instance.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            documents: store.clone(),
            keys: store.clone(),
            access_log: store,
        }
    }
}

/// Tunables that are not owned by a single component.
#[derive(Debug, Clone, Copy)]
pub struct VaultSettings {
    /// Encrypt non-confidential documents as well.
    pub encrypt_all: bool,
    /// Largest accepted content, in bytes.
    pub max_upload_size: u64,
}

/// The assembled service graph.
#[derive(Debug, Clone)]
pub struct DocVault {
    /// Document operations.
    pub documents: Arc<DocumentService>,
    /// Version chains.
    pub versions: Arc<VersionEngine>,
    /// Access log reader and writer.
    pub audit: Arc<AuditLogger>,
    /// Blob storage.
    pub storage: StorageManager,
}

impl DocVault {
    /// Wire every service from its dependencies.
    pub fn new(
        stores: Stores,
        crypto: Arc<CryptoEngine>,
        storage: StorageManager,
        settings: VaultSettings,
    ) -> Self {
        let locks = Arc::new(DocumentLocks::new());
        let versions = Arc::new(VersionEngine::new(
            stores.documents.clone(),
            stores.keys,
            crypto,
            storage.clone(),
            locks,
            settings.encrypt_all,
        ));
        let audit = Arc::new(AuditLogger::new(stores.access_log));
        let documents = Arc::new(DocumentService::new(
            stores.documents,
            versions.clone(),
            audit.clone(),
            AccessEvaluator::new(),
            storage.clone(),
            settings.max_upload_size,
        ));

        Self {
            documents,
            versions,
            audit,
            storage,
        }
    }
}
