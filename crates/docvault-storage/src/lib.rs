//! # docvault-storage
//!
//! Blob storage for DocVault. Every stored version is addressed by a
//! self-describing [`StorageRef`] (`<backend>://<key>`), so content written
//! to one backend stays readable after the default backend changes.

pub mod manager;
pub mod providers;
pub mod reference;

pub use manager::StorageManager;
pub use reference::StorageRef;
