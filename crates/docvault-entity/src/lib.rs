//! # docvault-entity
//!
//! Domain entity models for DocVault. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod audit;
pub mod document;
pub mod key;

pub use audit::{AccessAction, AccessDecision, AccessLogEntry, CreateAccessLogEntry};
pub use document::{
    Document, DocumentId, DocumentStatus, DocumentType, DocumentVersion, LinkedEntityType,
};
pub use key::EncryptionKey;
