//! Document CLI commands.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use docvault_core::error::AppError;
use docvault_entity::document::{Document, DocumentId};
use docvault_service::{AccessSettingsUpdate, RequestContext, UpdateRequest, UploadRequest};

use super::Runtime;
use crate::output::{self, OutputFormat};

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document subcommand
    #[command(subcommand)]
    pub command: DocumentCommand,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// Upload a new document
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Linked entity type (borrower, loan_account, case)
        #[arg(long)]
        entity_type: String,
        /// Linked entity id
        #[arg(long)]
        entity_id: String,
        /// Document type (legal_notice, court_order, ...)
        #[arg(long, default_value = "other")]
        doc_type: String,
        /// Override document name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
        /// Declared MIME type
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,
        /// Mark the document confidential
        #[arg(long)]
        confidential: bool,
        /// Role granted access (repeatable)
        #[arg(long = "grant", required = true)]
        grants: Vec<String>,
    },
    /// Upload every entry of a JSON manifest
    BulkUpload {
        /// Path to the manifest
        manifest: PathBuf,
    },
    /// Add a new version
    Update {
        /// Document id
        id: String,
        /// Path to the new content
        file: PathBuf,
        /// What changed
        #[arg(short, long)]
        summary: String,
        /// Declared MIME type
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,
    },
    /// Write a version's content to a file
    Download {
        /// Document id
        id: String,
        /// Version number (latest when omitted)
        #[arg(short, long)]
        version: Option<i32>,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show document metadata
    Info {
        /// Document id
        id: String,
    },
    /// Change confidentiality or granted roles
    Access {
        /// Document id
        id: String,
        /// New confidentiality flag
        #[arg(long)]
        confidential: Option<bool>,
        /// Replacement role set (repeatable)
        #[arg(long = "grant")]
        grants: Vec<String>,
    },
    /// Delete a document and its stored versions
    Delete {
        /// Document id
        id: String,
    },
}

/// One entry of a bulk upload manifest; `file` is relative to the manifest.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    file: PathBuf,
    name: Option<String>,
    entity_type: String,
    entity_id: String,
    #[serde(default = "default_doc_type")]
    doc_type: String,
    #[serde(default = "default_mime")]
    mime: String,
    #[serde(default)]
    confidential: bool,
    grants: Vec<String>,
}

fn default_doc_type() -> String {
    "other".to_string()
}

fn default_mime() -> String {
    "application/octet-stream".to_string()
}

/// Document display row
#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    /// Document id
    id: String,
    /// Name
    name: String,
    /// Type
    doc_type: String,
    /// Current version
    version: i32,
    /// Confidential
    confidential: bool,
    /// Status
    status: String,
}

impl From<&Document> for DocumentRow {
    fn from(d: &Document) -> Self {
        Self {
            id: d.document_id.to_string(),
            name: d.document_name.clone(),
            doc_type: d.document_type.to_string(),
            version: d.current_version_number,
            confidential: d.confidential_flag,
            status: d.status.to_string(),
        }
    }
}

/// Bulk upload failure row
#[derive(Debug, Serialize, Tabled)]
struct FailureRow {
    /// Manifest index
    index: usize,
    /// Document name
    name: String,
    /// Error kind
    kind: String,
    /// Reason
    reason: String,
}

/// Execute document commands
pub async fn execute(
    args: &DocumentArgs,
    runtime: &Runtime,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let documents = &runtime.vault.documents;

    match &args.command {
        DocumentCommand::Upload {
            file,
            entity_type,
            entity_id,
            doc_type,
            name,
            mime,
            confidential,
            grants,
        } => {
            let request = UploadRequest {
                linked_entity_type: entity_type.parse()?,
                linked_entity_id: entity_id.clone(),
                document_name: name.clone().unwrap_or_else(|| file_name(file)),
                document_type: doc_type.parse()?,
                confidential: *confidential,
                access_permissions: grants.clone(),
                file_format: mime.clone(),
                content: read_file(file).await?,
            };
            let outcome = documents.upload(ctx, request).await?;
            print_document(&outcome.document, format);
            output::print_success(&format!(
                "Uploaded {} (v1, {} bytes)",
                outcome.document.document_id, outcome.version.file_size_bytes
            ));
        }
        DocumentCommand::BulkUpload { manifest } => {
            let raw = tokio::fs::read(manifest).await?;
            let entries: Vec<ManifestEntry> = serde_json::from_slice(&raw)
                .map_err(|e| AppError::validation(format!("Invalid manifest: {e}")))?;
            let base = manifest.parent().unwrap_or_else(|| Path::new("."));

            let mut requests = Vec::with_capacity(entries.len());
            for entry in entries {
                let path = base.join(&entry.file);
                requests.push(UploadRequest {
                    linked_entity_type: entry.entity_type.parse()?,
                    linked_entity_id: entry.entity_id,
                    document_name: entry.name.unwrap_or_else(|| file_name(&path)),
                    document_type: entry.doc_type.parse()?,
                    confidential: entry.confidential,
                    access_permissions: entry.grants,
                    file_format: entry.mime,
                    content: read_file(&path).await?,
                });
            }

            let result = documents.bulk_upload(ctx, requests).await;
            let uploaded: Vec<DocumentRow> = result
                .succeeded
                .iter()
                .map(|o| DocumentRow::from(&o.document))
                .collect();
            output::print_list(&uploaded, format);
            if !result.failed.is_empty() {
                let failures: Vec<FailureRow> = result
                    .failed
                    .iter()
                    .map(|f| FailureRow {
                        index: f.index,
                        name: f.document_name.clone(),
                        kind: f.kind.to_string(),
                        reason: f.reason.clone(),
                    })
                    .collect();
                output::print_warning(&format!("{} upload(s) failed", failures.len()));
                output::print_list(&failures, format);
            }
        }
        DocumentCommand::Update {
            id,
            file,
            summary,
            mime,
        } => {
            let id: DocumentId = id.parse()?;
            let request = UpdateRequest {
                file_format: mime.clone(),
                change_summary: summary.clone(),
                content: read_file(file).await?,
            };
            let committed = documents.update(ctx, &id, request).await?;
            output::print_success(&format!(
                "Created v{} of {}",
                committed.version.version_number, id
            ));
        }
        DocumentCommand::Download {
            id,
            version,
            output: out_path,
        } => {
            let id: DocumentId = id.parse()?;
            let retrieved = documents.download(ctx, &id, *version).await?;
            tokio::fs::write(out_path, &retrieved.content).await?;
            output::print_success(&format!(
                "Wrote v{} of {} ({} bytes) to '{}'",
                retrieved.version.version_number,
                id,
                retrieved.content.len(),
                out_path.display()
            ));
        }
        DocumentCommand::Info { id } => {
            let id: DocumentId = id.parse()?;
            let document = documents.get_metadata(ctx, &id).await?;
            print_document(&document, format);
        }
        DocumentCommand::Access {
            id,
            confidential,
            grants,
        } => {
            let id: DocumentId = id.parse()?;
            let update = AccessSettingsUpdate {
                confidential: *confidential,
                access_permissions: (!grants.is_empty()).then(|| grants.clone()),
            };
            let document = documents.update_access(ctx, &id, update).await?;
            print_document(&document, format);
        }
        DocumentCommand::Delete { id } => {
            let id: DocumentId = id.parse()?;
            let outcome = documents.delete(ctx, &id).await?;
            let cleanup = &outcome.cleanup;
            output::print_item(
                &outcome,
                &[
                    ("Document", id.to_string()),
                    ("Status", outcome.document.status.to_string()),
                    ("Local files deleted", cleanup.local_files_deleted.to_string()),
                    ("Remote files deleted", cleanup.remote_files_deleted.to_string()),
                    ("Files not found", cleanup.files_not_found.to_string()),
                    ("Errors", cleanup.errors.len().to_string()),
                ],
                format,
            );
            for error in &cleanup.errors {
                output::print_warning(error);
            }
        }
    }

    Ok(())
}

fn print_document(document: &Document, format: OutputFormat) {
    output::print_item(
        document,
        &[
            ("Document", document.document_id.to_string()),
            ("Name", document.document_name.clone()),
            ("Type", document.document_type.to_string()),
            (
                "Linked entity",
                format!("{} {}", document.linked_entity_type, document.linked_entity_id),
            ),
            ("Current version", document.current_version_number.to_string()),
            ("Confidential", document.confidential_flag.to_string()),
            ("Access", document.access_permissions.join(", ")),
            ("Status", document.status.to_string()),
            ("Created by", document.created_by.clone()),
            ("Last updated", document.last_updated.to_rfc3339()),
        ],
        format,
    );
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string()
}

async fn read_file(path: &Path) -> Result<Bytes, AppError> {
    if !tokio::fs::try_exists(path).await? {
        return Err(AppError::not_found(format!(
            "File not found: {}",
            path.display()
        )));
    }
    Ok(Bytes::from(tokio::fs::read(path).await?))
}
