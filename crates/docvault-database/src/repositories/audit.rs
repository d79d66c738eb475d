//! Access log repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::audit::{AccessLogEntry, CreateAccessLogEntry};

use crate::store::{AccessLogFilter, AccessLogStore};

/// Repository for the append-only access log.
#[derive(Debug, Clone)]
pub struct AccessLogRepository {
    pool: PgPool,
}

impl AccessLogRepository {
    /// Create a new access log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccessLogEntry>> {
        sqlx::query_as::<_, AccessLogEntry>("SELECT * FROM access_log WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find access log entry", e)
            })
    }
}

#[async_trait]
impl AccessLogStore for AccessLogRepository {
    async fn append(&self, entry: &CreateAccessLogEntry) -> AppResult<AccessLogEntry> {
        sqlx::query_as::<_, AccessLogEntry>(
            "INSERT INTO access_log (id, document_id, actor, action, decision, reason, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&entry.document_id)
        .bind(&entry.actor)
        .bind(entry.action)
        .bind(entry.decision)
        .bind(&entry.reason)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append access log entry", e)
        })
    }

    async fn search(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLogEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.document_id.is_some() {
            conditions.push(format!("document_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.actor.is_some() {
            conditions.push(format!("actor = ${param_idx}"));
            param_idx += 1;
        }
        if filter.action.is_some() {
            conditions.push(format!("action = ${param_idx}"));
            param_idx += 1;
        }
        if filter.decision.is_some() {
            conditions.push(format!("decision = ${param_idx}"));
            param_idx += 1;
        }
        if filter.since.is_some() {
            conditions.push(format!("timestamp >= ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM access_log {where_clause}");
        let select_sql = format!(
            "SELECT * FROM access_log {where_clause} ORDER BY timestamp DESC, id DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AccessLogEntry>(&select_sql);

        if let Some(id) = &filter.document_id {
            count_query = count_query.bind(id);
            select_query = select_query.bind(id);
        }
        if let Some(actor) = &filter.actor {
            count_query = count_query.bind(actor);
            select_query = select_query.bind(actor);
        }
        if let Some(action) = filter.action {
            count_query = count_query.bind(action);
            select_query = select_query.bind(action);
        }
        if let Some(decision) = filter.decision {
            count_query = count_query.bind(decision);
            select_query = select_query.bind(decision);
        }
        if let Some(since) = filter.since {
            count_query = count_query.bind(since);
            select_query = select_query.bind(since);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count access log entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search access log", e)
            })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
