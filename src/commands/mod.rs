//! CLI command definitions and dispatch.

pub mod audit;
pub mod document;
pub mod health;
pub mod migrate;
pub mod version;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_crypto::CryptoEngine;
use docvault_database::DatabasePool;
use docvault_service::{DocVault, RequestContext, Stores, VaultSettings};
use docvault_storage::StorageManager;

use crate::output::OutputFormat;

/// DocVault secure document repository
#[derive(Debug, Parser)]
#[command(name = "docvault", version, about, long_about = None)]
pub struct Cli {
    /// Path to an overlay configuration file
    #[arg(short, long, default_value = "config/local.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Actor recorded in the audit trail
    #[arg(long, global = true, default_value = "cli")]
    pub actor: String,

    /// Role held by the actor (repeatable)
    #[arg(long = "role", global = true)]
    pub roles: Vec<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
    /// Document operations
    Document(document::DocumentArgs),
    /// Version history operations
    Version(version::VersionArgs),
    /// Access log queries
    Audit(audit::AuditArgs),
    /// Check database and storage backends
    Health,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Document(args) => {
                let runtime = Runtime::connect(&config).await?;
                document::execute(args, &runtime, &self.context(), self.format).await
            }
            Commands::Version(args) => {
                let runtime = Runtime::connect(&config).await?;
                version::execute(args, &runtime, &self.context(), self.format).await
            }
            Commands::Audit(args) => {
                let runtime = Runtime::connect(&config).await?;
                audit::execute(args, &runtime, self.format).await
            }
            Commands::Health => {
                let runtime = Runtime::connect(&config).await?;
                health::execute(&runtime, self.format).await
            }
        }
    }

    fn context(&self) -> RequestContext {
        RequestContext::new(self.actor.clone(), self.roles.iter().cloned())
    }
}

/// Everything a command needs to talk to the repository.
pub struct Runtime {
    /// Wired services.
    pub vault: DocVault,
    /// Database pool, kept for health checks.
    pub db: DatabasePool,
}

impl Runtime {
    /// Connect to PostgreSQL and the configured backends.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        let (documents, keys, access_log) = db.repositories();
        let stores = Stores {
            documents: Arc::new(documents),
            keys: Arc::new(keys),
            access_log: Arc::new(access_log),
        };

        let crypto = Arc::new(CryptoEngine::new(config.crypto.master_key_bytes()?));
        let storage = StorageManager::from_config(&config.storage).await?;
        let vault = DocVault::new(
            stores,
            crypto,
            storage,
            VaultSettings {
                encrypt_all: config.crypto.encrypt_all,
                max_upload_size: config.storage.max_upload_size_bytes,
            },
        );

        Ok(Self { vault, db })
    }
}
