//! Document ownership and upload constraints.
//!
//! A document hangs off exactly one owning record. The owner is a closed
//! tagged union so every consumer must handle each kind exhaustively; it
//! is encoded to an `(entity_type, entity_id)` column pair only at the
//! database edge.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// `documents.entity_type` value for assets.
pub const ENTITY_ASSET: &str = "asset";
/// `documents.entity_type` value for software licenses.
pub const ENTITY_LICENSE: &str = "license";
/// `documents.entity_type` value for users.
pub const ENTITY_USER: &str = "user";

/// The record a document is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", content = "entity_id", rename_all = "snake_case")]
pub enum DocumentOwner {
    Asset(DbId),
    License(DbId),
    User(DbId),
}

impl DocumentOwner {
    /// Column value for `documents.entity_type`.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Asset(_) => ENTITY_ASSET,
            Self::License(_) => ENTITY_LICENSE,
            Self::User(_) => ENTITY_USER,
        }
    }

    /// Column value for `documents.entity_id`.
    pub fn entity_id(&self) -> DbId {
        match self {
            Self::Asset(id) | Self::License(id) | Self::User(id) => *id,
        }
    }

    /// Decode a stored column pair. Returns `None` for unknown kinds,
    /// which can only mean a migration gap.
    pub fn from_parts(entity_type: &str, entity_id: DbId) -> Option<Self> {
        match entity_type {
            ENTITY_ASSET => Some(Self::Asset(entity_id)),
            ENTITY_LICENSE => Some(Self::License(entity_id)),
            ENTITY_USER => Some(Self::User(entity_id)),
            _ => None,
        }
    }
}

/// Accepted document categories.
pub const DOCUMENT_CATEGORIES: &[&str] = &[
    "invoice", "warranty", "manual", "photo", "contract", "other",
];

/// Accepted upload MIME types.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/webp",
    "text/plain",
    "text/csv",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Validate that the given category is recognized.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if DOCUMENT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown document category: '{category}'. Valid categories: {}",
            DOCUMENT_CATEGORIES.join(", ")
        )))
    }
}

/// Validate that the upload's declared MIME type is accepted.
pub fn validate_mime_type(mime: &str) -> Result<(), CoreError> {
    if ALLOWED_MIME_TYPES.contains(&mime) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "File type '{mime}' is not accepted"
        )))
    }
}

/// Validate an uploaded file's original name.
///
/// The name is stored as metadata and echoed back inside a quoted
/// `Content-Disposition` filename parameter on download, so quotes,
/// backslashes, path separators, and control characters are rejected
/// here rather than escaped later.
pub fn validate_file_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("File name must not be empty".into()));
    }
    if name.chars().count() > 255 {
        return Err(CoreError::Validation(
            "File name must be at most 255 characters".into(),
        ));
    }
    if name
        .chars()
        .any(|c| c.is_control() || matches!(c, '"' | '\\' | '/'))
    {
        return Err(CoreError::Validation(
            "File name must not contain quotes, slashes, or control characters".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_encodes_to_column_pair() {
        let owner = DocumentOwner::Asset(42);
        assert_eq!(owner.entity_type(), "asset");
        assert_eq!(owner.entity_id(), 42);
        assert_eq!(DocumentOwner::License(7).entity_type(), "license");
        assert_eq!(DocumentOwner::User(9).entity_type(), "user");
    }

    #[test]
    fn owner_decodes_from_column_pair() {
        assert_eq!(
            DocumentOwner::from_parts("asset", 42),
            Some(DocumentOwner::Asset(42))
        );
        assert_eq!(
            DocumentOwner::from_parts("license", 7),
            Some(DocumentOwner::License(7))
        );
        assert_eq!(DocumentOwner::from_parts("invoice", 1), None);
    }

    #[test]
    fn owner_serializes_as_tagged_pair() {
        let json = serde_json::to_value(DocumentOwner::Asset(42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"entity_type": "asset", "entity_id": 42})
        );
        let back: DocumentOwner = serde_json::from_value(json).unwrap();
        assert_eq!(back, DocumentOwner::Asset(42));
    }

    #[test]
    fn categories_are_validated() {
        assert!(validate_category("invoice").is_ok());
        assert!(validate_category("meme").is_err());
    }

    #[test]
    fn mime_types_are_validated() {
        assert!(validate_mime_type("application/pdf").is_ok());
        assert!(validate_mime_type("application/x-msdownload").is_err());
    }

    #[test]
    fn file_names_reject_header_breaking_characters() {
        assert!(validate_file_name("invoice 2024-03.pdf").is_ok());
        assert!(validate_file_name("naïve résumé.docx").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
        assert!(validate_file_name("evil\".pdf").is_err());
        assert!(validate_file_name("back\\slash.pdf").is_err());
        assert!(validate_file_name("path/part.pdf").is_err());
        assert!(validate_file_name("line\nbreak.pdf").is_err());
        assert!(validate_file_name(&"x".repeat(256)).is_err());
    }
}
