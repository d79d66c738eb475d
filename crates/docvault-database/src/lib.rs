//! # docvault-database
//!
//! Persistence for DocVault: the store traits the service layer depends on,
//! their PostgreSQL implementations, and an in-memory implementation that
//! upholds the same invariants.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AccessLogFilter, AccessLogStore, DocumentStore, KeyStore};
