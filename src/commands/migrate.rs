//! Database migration command.

use clap::Args;

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_database::DatabasePool;
use docvault_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {}

/// Execute the migrate command
pub async fn execute(_args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    let applied = run_migrations(db.pool()).await?;
    db.close().await;

    output::print_success(&format!("{applied} migration(s) available, database is up to date"));
    Ok(())
}
