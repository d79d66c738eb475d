//! Document lineage and version entities.

pub mod id;
pub mod kind;
pub mod model;
pub mod version;

pub use id::DocumentId;
pub use kind::{DocumentStatus, DocumentType, LinkedEntityType};
pub use model::{Document, MAX_DOCUMENT_NAME_LEN, normalize_permissions};
pub use version::DocumentVersion;
