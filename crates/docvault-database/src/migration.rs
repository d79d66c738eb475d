//! Database migration runner.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use docvault_core::error::{AppError, ErrorKind};

/// Schema migrations embedded from the workspace `migrations/` directory.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Run all pending database migrations and return how many the schema knows.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, AppError> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    for migration in MIGRATOR.iter() {
        info!(version = migration.version, description = %migration.description, "Schema migration in place");
    }
    Ok(MIGRATOR.iter().count())
}
