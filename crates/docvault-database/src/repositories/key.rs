//! Encryption key descriptor repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::key::EncryptionKey;

use crate::store::KeyStore;

/// Repository for key descriptors. Raw key material is never persisted.
#[derive(Debug, Clone)]
pub struct KeyRepository {
    pool: PgPool,
}

impl KeyRepository {
    /// Create a new key repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyStore for KeyRepository {
    async fn insert_key(&self, key: &EncryptionKey) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO encryption_keys (key_ref, algorithm, salt, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&key.key_ref)
        .bind(&key.algorithm)
        .bind(&key.salt)
        .bind(key.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store key descriptor", e))?;
        Ok(())
    }

    async fn find_key(&self, key_ref: &str) -> AppResult<Option<EncryptionKey>> {
        sqlx::query_as::<_, EncryptionKey>("SELECT * FROM encryption_keys WHERE key_ref = $1")
            .bind(key_ref)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find key descriptor", e))
    }
}
