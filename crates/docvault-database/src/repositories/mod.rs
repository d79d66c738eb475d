//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod document;
pub mod key;

pub use audit::AccessLogRepository;
pub use document::DocumentRepository;
pub use key::KeyRepository;
