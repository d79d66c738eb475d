//! Role- and confidentiality-based access control.

pub mod evaluator;
pub mod policy;

pub use evaluator::{AccessEvaluator, Verdict};
pub use policy::AccessPolicy;
