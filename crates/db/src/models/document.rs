//! Document (attachment) model and DTOs.
//!
//! The owner is stored as an `(entity_type, entity_id)` pair but only
//! handled in code as the closed `DocumentOwner` union from
//! `stocktake_core`, so unknown entity kinds cannot be written.

use serde::Serialize;
use sqlx::FromRow;
use stocktake_core::document::DocumentOwner;
use stocktake_core::types::{DbId, Timestamp};

/// A document row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub category: String,
    pub description: Option<String>,
    pub uploaded_by: DbId,
    pub mime_type: String,
    pub file_name: String,
    /// Key of the stored blob under the configured upload directory.
    pub storage_key: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

impl Document {
    /// Decode the stored owner pair. `None` only for rows predating the
    /// known entity kinds, which a migration should have rewritten.
    pub fn owner(&self) -> Option<DocumentOwner> {
        DocumentOwner::from_parts(&self.entity_type, self.entity_id)
    }
}

/// Insert payload assembled by the upload handler after validation.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub owner: DocumentOwner,
    pub category: String,
    pub description: Option<String>,
    pub uploaded_by: DbId,
    pub mime_type: String,
    pub file_name: String,
    pub storage_key: String,
    pub size_bytes: i64,
}
