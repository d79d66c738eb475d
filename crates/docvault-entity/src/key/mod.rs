//! Encryption key descriptors.

pub mod model;

pub use model::EncryptionKey;
