//! Repository for the `documents` table.
//!
//! Documents are the one entity without soft delete: removing a
//! document removes its row, and the handler removes the stored blob.

use sqlx::PgPool;
use stocktake_core::document::DocumentOwner;
use stocktake_core::types::DbId;

use crate::models::document::{CreateDocument, Document};

const COLUMNS: &str = "id, entity_type, entity_id, category, description, uploaded_by, \
     mime_type, file_name, storage_key, size_bytes, created_at";

/// Provides attachment operations.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document row, returning it.
    pub async fn create(pool: &PgPool, input: &CreateDocument) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (entity_type, entity_id, category, description, \
                uploaded_by, mime_type, file_name, storage_key, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(input.owner.entity_type())
            .bind(input.owner.entity_id())
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.uploaded_by)
            .bind(&input.mime_type)
            .bind(&input.file_name)
            .bind(&input.storage_key)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    /// Find a document by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List documents, optionally restricted to one owning record,
    /// newest first.
    pub async fn list(
        pool: &PgPool,
        owner: Option<DocumentOwner>,
    ) -> Result<Vec<Document>, sqlx::Error> {
        match owner {
            Some(owner) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM documents \
                     WHERE entity_type = $1 AND entity_id = $2 \
                     ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, Document>(&query)
                    .bind(owner.entity_type())
                    .bind(owner.entity_id())
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM documents ORDER BY created_at DESC, id DESC");
                sqlx::query_as::<_, Document>(&query).fetch_all(pool).await
            }
        }
    }

    /// Permanently delete a document row. Returns `true` if a row was
    /// removed; the caller deletes the blob.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
