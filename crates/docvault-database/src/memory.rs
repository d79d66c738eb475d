//! In-memory store for tests and ephemeral deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::audit::{AccessLogEntry, CreateAccessLogEntry};
use docvault_entity::document::{Document, DocumentId, DocumentStatus, DocumentVersion};
use docvault_entity::key::EncryptionKey;

use crate::store::{AccessLogFilter, AccessLogStore, DocumentStore, KeyStore};

/// Documents and versions guarded together so commits are atomic.
#[derive(Debug, Default)]
struct Chains {
    documents: HashMap<DocumentId, Document>,
    /// Versions per document, oldest first.
    versions: HashMap<DocumentId, Vec<DocumentVersion>>,
}

/// Process-local implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chains: RwLock<Chains>,
    sequences: DashMap<NaiveDate, u32>,
    keys: DashMap<String, EncryptionKey>,
    access_log: RwLock<Vec<AccessLogEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of access log entries recorded.
    pub async fn access_log_len(&self) -> usize {
        self.access_log.read().await.len()
    }

    /// Number of key descriptors persisted.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn next_document_sequence(&self, day: NaiveDate) -> AppResult<u32> {
        let mut entry = self.sequences.entry(day).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn create_document(&self, document: &Document, first: &DocumentVersion) -> AppResult<()> {
        let mut chains = self.chains.write().await;
        if chains.documents.contains_key(&document.document_id) {
            return Err(AppError::database(format!(
                "Document {} already exists",
                document.document_id
            )));
        }
        chains
            .documents
            .insert(document.document_id.clone(), document.clone());
        chains
            .versions
            .insert(document.document_id.clone(), vec![first.clone()]);
        Ok(())
    }

    async fn find_document(&self, id: &DocumentId) -> AppResult<Option<Document>> {
        Ok(self.chains.read().await.documents.get(id).cloned())
    }

    async fn commit_version(
        &self,
        expected_current: i32,
        version: &DocumentVersion,
    ) -> AppResult<Document> {
        let id = &version.document_id;
        if version.version_number != expected_current + 1 {
            return Err(AppError::internal(format!(
                "Version {} does not follow v{expected_current} of {id}",
                version.version_number
            )));
        }

        let mut guard = self.chains.write().await;
        let chains = &mut *guard;

        let document = chains
            .documents
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        if document.status == DocumentStatus::Deleted {
            return Err(AppError::not_found(format!("Document {id} has been deleted")));
        }
        if document.current_version_number != expected_current {
            return Err(AppError::version_conflict(format!(
                "Document {id} moved to v{} while v{} was being written",
                document.current_version_number, version.version_number
            )));
        }

        let versions = chains.versions.entry(id.clone()).or_default();
        for existing in versions.iter_mut() {
            existing.is_latest_version = false;
        }
        versions.push(version.clone());

        document.current_version_number = version.version_number;
        document.last_updated = version.created_at;
        if document.encryption_key_ref.is_none() {
            document.encryption_key_ref = version.encryption_key_ref.clone();
        }
        Ok(document.clone())
    }

    async fn update_access_settings(
        &self,
        id: &DocumentId,
        confidential: bool,
        permissions: &[String],
    ) -> AppResult<Document> {
        let mut chains = self.chains.write().await;
        let document = chains
            .documents
            .get_mut(id)
            .filter(|d| d.is_active())
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        document.confidential_flag = confidential;
        document.access_permissions = permissions.to_vec();
        document.last_updated = Utc::now();
        Ok(document.clone())
    }

    async fn mark_deleted(&self, id: &DocumentId) -> AppResult<Document> {
        let mut chains = self.chains.write().await;
        let document = chains
            .documents
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        if document.is_active() {
            document.status = DocumentStatus::Deleted;
            document.last_updated = Utc::now();
        }
        Ok(document.clone())
    }

    async fn find_version(
        &self,
        id: &DocumentId,
        version_number: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        let chains = self.chains.read().await;
        Ok(chains
            .versions
            .get(id)
            .and_then(|vs| vs.iter().find(|v| v.version_number == version_number))
            .cloned())
    }

    async fn list_versions(
        &self,
        id: &DocumentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DocumentVersion>> {
        let chains = self.chains.read().await;
        let mut versions = chains.versions.get(id).cloned().unwrap_or_default();
        versions.reverse();
        Ok(PageResponse::from_slice(&versions, page))
    }

    async fn all_versions(&self, id: &DocumentId) -> AppResult<Vec<DocumentVersion>> {
        let chains = self.chains.read().await;
        Ok(chains.versions.get(id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn insert_key(&self, key: &EncryptionKey) -> AppResult<()> {
        if self.keys.contains_key(&key.key_ref) {
            return Err(AppError::database(format!(
                "Key descriptor {} already exists",
                key.key_ref
            )));
        }
        self.keys.insert(key.key_ref.clone(), key.clone());
        Ok(())
    }

    async fn find_key(&self, key_ref: &str) -> AppResult<Option<EncryptionKey>> {
        Ok(self.keys.get(key_ref).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl AccessLogStore for MemoryStore {
    async fn append(&self, entry: &CreateAccessLogEntry) -> AppResult<AccessLogEntry> {
        let record = AccessLogEntry {
            id: Uuid::now_v7(),
            document_id: entry.document_id.clone(),
            actor: entry.actor.clone(),
            action: entry.action,
            decision: entry.decision,
            reason: entry.reason.clone(),
            timestamp: Utc::now(),
        };
        self.access_log.write().await.push(record.clone());
        Ok(record)
    }

    async fn search(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLogEntry>> {
        let log = self.access_log.read().await;
        let matching: Vec<AccessLogEntry> = log
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        Ok(PageResponse::from_slice(&matching, page))
    }
}
