//! Version history CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docvault_core::error::AppError;
use docvault_core::types::pagination::PageRequest;
use docvault_entity::document::DocumentId;
use docvault_service::RequestContext;

use super::Runtime;
use crate::output::{self, OutputFormat};

/// Arguments for version commands
#[derive(Debug, Args)]
pub struct VersionArgs {
    /// Version subcommand
    #[command(subcommand)]
    pub command: VersionCommand,
}

/// Version subcommands
#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// List versions, newest first
    List {
        /// Document id
        id: String,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(short = 'n', long, default_value = "25")]
        page_size: u64,
    },
    /// Re-publish an earlier version as the newest one
    Rollback {
        /// Document id
        id: String,
        /// Version to restore
        target: i32,
    },
    /// Compare two versions
    Diff {
        /// Document id
        id: String,
        /// Left-hand version
        from: i32,
        /// Right-hand version
        to: i32,
    },
}

/// Version display row
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version number
    version: i32,
    /// Latest flag
    latest: bool,
    /// Size in bytes
    size: i64,
    /// Encrypted
    encrypted: bool,
    /// Content hash prefix
    hash: String,
    /// Backend
    storage: String,
    /// Author
    created_by: String,
    /// Time
    created_at: String,
    /// Change summary
    summary: String,
}

/// Execute version commands
pub async fn execute(
    args: &VersionArgs,
    runtime: &Runtime,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let documents = &runtime.vault.documents;

    match &args.command {
        VersionCommand::List {
            id,
            page,
            page_size,
        } => {
            let id: DocumentId = id.parse()?;
            let response = documents
                .list_versions(ctx, &id, &PageRequest::new(*page, *page_size))
                .await?;

            let rows: Vec<VersionRow> = response
                .items
                .iter()
                .map(|v| VersionRow {
                    version: v.version_number,
                    latest: v.is_latest_version,
                    size: v.file_size_bytes,
                    encrypted: v.encrypted,
                    hash: v.content_hash.chars().take(12).collect(),
                    storage: v
                        .storage_ref
                        .split_once("://")
                        .map(|(backend, _)| backend.to_string())
                        .unwrap_or_default(),
                    created_by: v.created_by.clone(),
                    created_at: v.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    summary: v.change_summary.clone().unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} versions)",
                    response.page, response.total_pages, response.total_items
                );
            }
        }
        VersionCommand::Rollback { id, target } => {
            let id: DocumentId = id.parse()?;
            let committed = documents.rollback(ctx, &id, *target).await?;
            output::print_success(&format!(
                "Restored v{target} of {id} as v{}",
                committed.version.version_number
            ));
        }
        VersionCommand::Diff { id, from, to } => {
            let id: DocumentId = id.parse()?;
            let diff = documents.diff(ctx, &id, *from, *to).await?;
            let range = |r: Option<docvault_service::version::ByteRange>| {
                r.map(|r| format!("[{}, {})", r.start, r.end))
                    .unwrap_or_else(|| "-".to_string())
            };
            output::print_item(
                &diff,
                &[
                    ("Document", diff.document_id.to_string()),
                    ("Versions", format!("v{} -> v{}", diff.from_version, diff.to_version)),
                    ("Identical", diff.identical.to_string()),
                    ("Size", format!("{} -> {} ({:+})", diff.from_size, diff.to_size, diff.size_delta)),
                    ("Format", format!("{} -> {}", diff.from_format, diff.to_format)),
                    ("Common prefix", diff.common_prefix_len.to_string()),
                    ("Common suffix", diff.common_suffix_len.to_string()),
                    ("Changed (from)", range(diff.from_changed)),
                    ("Changed (to)", range(diff.to_changed)),
                ],
                format,
            );
        }
    }

    Ok(())
}
