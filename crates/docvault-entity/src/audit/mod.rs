//! Access audit trail entities.

pub mod action;
pub mod model;

pub use action::{AccessAction, AccessDecision};
pub use model::{AccessLogEntry, CreateAccessLogEntry};
