//! # docvault-auth
//!
//! Authorization for the DocVault document repository.
//!
//! ## Modules
//!
//! - `access`: the access policy (privileged roles) and the pure evaluator
//!   that turns `(roles, action, document)` into an allow/deny verdict

pub mod access;

pub use access::{AccessEvaluator, AccessPolicy, Verdict};
