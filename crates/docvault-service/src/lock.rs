//! Per-document exclusive sections.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use docvault_entity::document::DocumentId;

/// Lazily created async mutexes keyed by document id.
///
/// Operations on different documents never contend; operations on the same
/// document run one at a time while the guard is held.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    locks: DashMap<DocumentId, Arc<Mutex<()>>>,
}

impl DocumentLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn lock(&self, id: &DocumentId) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(&*self.locks.entry(id.clone()).or_default());
        mutex.lock_owned().await
    }

    /// Number of documents that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no document has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_document_is_exclusive() {
        let locks = Arc::new(DocumentLocks::new());
        let id: DocumentId = "LDR-20240101-0001".parse().unwrap();

        let guard = locks.lock(&id).await;
        let contender = {
            let locks = Arc::clone(&locks);
            let id = id.clone();
            tokio::spawn(async move {
                let _g = locks.lock(&id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_documents_do_not_contend() {
        let locks = DocumentLocks::new();
        let a: DocumentId = "LDR-20240101-0001".parse().unwrap();
        let b: DocumentId = "LDR-20240101-0002".parse().unwrap();

        let _ga = locks.lock(&a).await;
        let _gb = tokio::time::timeout(Duration::from_millis(100), locks.lock(&b))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }
}
