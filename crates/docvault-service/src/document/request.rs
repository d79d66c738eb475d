//! Validated request types accepted by the document service.

use bytes::Bytes;
use validator::Validate;

use docvault_core::error::AppError;
use docvault_entity::document::{
    DocumentType, LinkedEntityType, MAX_DOCUMENT_NAME_LEN, normalize_permissions,
};

/// A new document and its first version.
#[derive(Debug, Clone, Validate)]
pub struct UploadRequest {
    /// Kind of business entity the document belongs to.
    pub linked_entity_type: LinkedEntityType,
    /// Linked entity id; existence is checked upstream.
    #[validate(length(min = 1, message = "Linked entity id is required"))]
    pub linked_entity_id: String,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Document name must be 1-100 characters"))]
    pub document_name: String,
    /// Classification.
    pub document_type: DocumentType,
    /// Restrict access to privileged roles.
    pub confidential: bool,
    /// Roles allowed to act on the document.
    #[validate(length(min = 1, message = "At least one role must be granted access"))]
    pub access_permissions: Vec<String>,
    /// Declared MIME type.
    #[validate(length(min = 1, message = "File format is required"))]
    pub file_format: String,
    /// Validated file content.
    pub content: Bytes,
}

impl UploadRequest {
    /// Check every field, returning the normalized permission set.
    pub fn check(&self, max_size: u64) -> Result<Vec<String>, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid upload: {e}")))?;

        if self.document_name.trim().is_empty() {
            return Err(AppError::validation("Document name is required"));
        }
        if self.document_name.trim().chars().count() > MAX_DOCUMENT_NAME_LEN {
            return Err(AppError::validation(format!(
                "Document name exceeds {MAX_DOCUMENT_NAME_LEN} characters"
            )));
        }
        if self.linked_entity_id.trim().is_empty() {
            return Err(AppError::validation("Linked entity id is required"));
        }
        check_content(&self.content, max_size)?;

        let permissions = normalize_permissions(&self.access_permissions);
        if permissions.is_empty() {
            return Err(AppError::validation("At least one role must be granted access"));
        }
        Ok(permissions)
    }
}

/// New content for an existing document.
#[derive(Debug, Clone, Validate)]
pub struct UpdateRequest {
    /// Declared MIME type of the new content.
    #[validate(length(min = 1, message = "File format is required"))]
    pub file_format: String,
    /// What changed.
    #[validate(length(min = 1, max = 1000, message = "Change summary must be 1-1000 characters"))]
    pub change_summary: String,
    /// Validated file content.
    pub content: Bytes,
}

impl UpdateRequest {
    /// Check every field.
    pub fn check(&self, max_size: u64) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid update: {e}")))?;
        if self.change_summary.trim().is_empty() {
            return Err(AppError::validation("A change summary is required"));
        }
        check_content(&self.content, max_size)
    }
}

/// Changes to a document's confidentiality or permission set.
#[derive(Debug, Clone, Default)]
pub struct AccessSettingsUpdate {
    /// New confidentiality flag.
    pub confidential: Option<bool>,
    /// Replacement permission set.
    pub access_permissions: Option<Vec<String>>,
}

impl AccessSettingsUpdate {
    /// Check the update, returning the normalized permission set if one was given.
    pub fn check(&self) -> Result<Option<Vec<String>>, AppError> {
        if self.confidential.is_none() && self.access_permissions.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }
        match &self.access_permissions {
            None => Ok(None),
            Some(roles) => {
                let permissions = normalize_permissions(roles);
                if permissions.is_empty() {
                    return Err(AppError::validation("At least one role must be granted access"));
                }
                Ok(Some(permissions))
            }
        }
    }
}

fn check_content(content: &Bytes, max_size: u64) -> Result<(), AppError> {
    if content.is_empty() {
        return Err(AppError::validation("File content is empty"));
    }
    if content.len() as u64 > max_size {
        return Err(AppError::validation(format!(
            "File of {} bytes exceeds the maximum of {max_size} bytes",
            content.len()
        )));
    }
    Ok(())
}
