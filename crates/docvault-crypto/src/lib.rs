//! # docvault-crypto
//!
//! Crypto engine for DocVault.
//!
//! ## Modules
//!
//! - `digest`: SHA-256 content hashing over plaintext
//! - `envelope`: sealed payload layout (`iv`, `tag`, `ciphertext`) and its on-disk framing
//! - `keyring`: key descriptors and Argon2id derivation from the master secret
//! - `engine`: AES-256-GCM encrypt/decrypt bound to key references

pub mod digest;
pub mod engine;
pub mod envelope;
pub mod keyring;

pub use digest::{content_hash, verify_hash};
pub use engine::CryptoEngine;
pub use envelope::SealedPayload;
pub use keyring::KeyRing;
