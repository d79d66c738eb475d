//! Access log CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docvault_core::error::AppError;
use docvault_core::types::pagination::PageRequest;
use docvault_database::AccessLogFilter;
use docvault_entity::audit::AccessLogEntry;

use super::Runtime;
use crate::output::{self, OutputFormat};

/// Page size used when exporting the whole trail.
const EXPORT_PAGE_SIZE: u64 = 100;

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Search the access log
    Search {
        /// Filter by document id
        #[arg(short, long)]
        document: Option<String>,
        /// Filter by actor
        #[arg(long)]
        actor: Option<String>,
        /// Filter by action (VIEW, DOWNLOAD, UPDATE, DELETE, ROLLBACK)
        #[arg(short, long)]
        action: Option<String>,
        /// Filter by decision (ALLOWED, DENIED)
        #[arg(long)]
        decision: Option<String>,
        /// Number of results
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
    /// Export access log entries to a JSON file
    Export {
        /// Output file path
        #[arg(short, long, default_value = "access_log_export.json")]
        output: PathBuf,
        /// Days of history to export
        #[arg(short, long, default_value = "30")]
        days: i64,
    },
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    /// Time
    time: String,
    /// Document
    document: String,
    /// Actor
    actor: String,
    /// Action
    action: String,
    /// Decision
    decision: String,
    /// Reason
    reason: String,
}

impl From<&AccessLogEntry> for AuditRow {
    fn from(e: &AccessLogEntry) -> Self {
        Self {
            time: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            document: e.document_id.to_string(),
            actor: e.actor.clone(),
            action: e.action.to_string(),
            decision: e.decision.to_string(),
            reason: e.reason.clone().unwrap_or_default(),
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    runtime: &Runtime,
    format: OutputFormat,
) -> Result<(), AppError> {
    let audit = &runtime.vault.audit;

    match &args.command {
        AuditCommand::Search {
            document,
            actor,
            action,
            decision,
            limit,
        } => {
            let filter = AccessLogFilter {
                document_id: document.as_deref().map(str::parse).transpose()?,
                actor: actor.clone(),
                action: action.as_deref().map(str::parse).transpose()?,
                decision: decision.as_deref().map(str::parse).transpose()?,
                since: None,
            };
            let response = audit.search(&filter, &PageRequest::new(1, *limit)).await?;
            let rows: Vec<AuditRow> = response.items.iter().map(AuditRow::from).collect();
            output::print_list(&rows, format);
        }
        AuditCommand::Export {
            output: out_path,
            days,
        } => {
            let filter = AccessLogFilter {
                since: Some(chrono::Utc::now() - chrono::Duration::days(*days)),
                ..Default::default()
            };

            let mut entries = Vec::new();
            let mut page = 1;
            loop {
                let response = audit
                    .search(&filter, &PageRequest::new(page, EXPORT_PAGE_SIZE))
                    .await?;
                entries.extend(response.items);
                if !response.has_next {
                    break;
                }
                page += 1;
            }

            let json = serde_json::to_string_pretty(&entries)?;
            tokio::fs::write(out_path, json).await?;

            output::print_success(&format!(
                "Exported {} access log entries to '{}'",
                entries.len(),
                out_path.display()
            ));
        }
    }

    Ok(())
}
