//! Document upload, download, and removal.
//!
//! Blobs live on disk under the configured upload directory, keyed by a
//! generated UUID; original filenames are metadata only and never touch
//! the filesystem. Rows are hard-deleted together with their blob.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stocktake_core::document::{self, DocumentOwner};
use stocktake_core::error::CoreError;
use stocktake_core::types::DbId;
use stocktake_db::models::document::CreateDocument;
use stocktake_db::repositories::DocumentRepo;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::{ensure_asset_exists, ensure_user_exists};
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;
use stocktake_db::repositories::LicenseRepo;

/// Optional owner filter for the document listing.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
}

impl DocumentFilter {
    fn owner(&self) -> AppResult<Option<DocumentOwner>> {
        match (&self.entity_type, self.entity_id) {
            (None, None) => Ok(None),
            (Some(kind), Some(id)) => DocumentOwner::from_parts(kind, id)
                .map(Some)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown entity type '{kind}'"))
                }),
            _ => Err(AppError::BadRequest(
                "entity_type and entity_id must be given together".to_string(),
            )),
        }
    }
}

/// Check that the owning record exists before attaching to it.
async fn ensure_owner_exists(pool: &sqlx::PgPool, owner: DocumentOwner) -> AppResult<()> {
    match owner {
        DocumentOwner::Asset(id) => ensure_asset_exists(pool, Some(id)).await,
        DocumentOwner::User(id) => ensure_user_exists(pool, Some(id)).await,
        DocumentOwner::License(id) => {
            LicenseRepo::find_by_id(pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "License",
                    id,
                }))?;
            Ok(())
        }
    }
}

fn blob_path(upload_dir: &str, storage_key: &str) -> std::path::PathBuf {
    std::path::Path::new(upload_dir).join(storage_key)
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/documents
///
/// All documents, or one record's documents with
/// `?entity_type=asset&entity_id=7`.
pub async fn list_documents(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<impl IntoResponse> {
    let owner = filter.owner()?;
    let documents = DocumentRepo::list(&state.pool, owner).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/documents/upload
///
/// Multipart upload: a `file` part plus `entity_type`, `entity_id`,
/// `category`, and optional `description` fields. The body limit is
/// enforced by the route layer before any buffering here.
pub async fn upload_document(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut entity_type: Option<String> = None;
    let mut entity_id: Option<DbId> = None;
    let mut category: Option<String> = None;
    let mut description: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .ok_or_else(|| AppError::BadRequest("File part has no filename".to_string()))?
                    .to_string();
                let mime_type = field
                    .content_type()
                    .ok_or_else(|| {
                        AppError::BadRequest("File part has no content type".to_string())
                    })?
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file part: {e}"))
                })?;
                file = Some((file_name, mime_type, data.to_vec()));
            }
            "entity_type" | "entity_id" | "category" | "description" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field '{name}': {e}"))
                })?;
                match name.as_str() {
                    "entity_type" => entity_type = Some(value),
                    "entity_id" => {
                        entity_id = Some(value.parse().map_err(|_| {
                            AppError::BadRequest("entity_id must be an integer".to_string())
                        })?)
                    }
                    "category" => category = Some(value),
                    _ => description = Some(value),
                }
            }
            // Unknown parts are skipped, matching the CSV importers'
            // tolerance for extra columns.
            _ => {}
        }
    }

    let entity_type =
        entity_type.ok_or_else(|| AppError::BadRequest("Missing field 'entity_type'".into()))?;
    let entity_id =
        entity_id.ok_or_else(|| AppError::BadRequest("Missing field 'entity_id'".into()))?;
    let category =
        category.ok_or_else(|| AppError::BadRequest("Missing field 'category'".into()))?;
    let (file_name, mime_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing file part".into()))?;

    let owner = DocumentOwner::from_parts(&entity_type, entity_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown entity type '{entity_type}'")))?;
    document::validate_category(&category).map_err(AppError::Core)?;
    document::validate_mime_type(&mime_type).map_err(AppError::Core)?;
    document::validate_file_name(&file_name).map_err(AppError::Core)?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    ensure_owner_exists(&state.pool, owner).await?;

    let storage_key = Uuid::new_v4().to_string();
    let path = blob_path(&state.config.upload_dir, &storage_key);
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Upload directory unavailable: {e}")))?;
    let size_bytes = data.len() as i64;
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let input = CreateDocument {
        owner,
        category,
        description,
        uploaded_by: user.user_id,
        mime_type,
        file_name,
        storage_key,
        size_bytes,
    };
    let created = match DocumentRepo::create(&state.pool, &input).await {
        Ok(doc) => doc,
        Err(err) => {
            // The row failed, so the blob must not linger.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::Database(err));
        }
    };

    tracing::info!(
        document_id = created.id,
        entity_type = %created.entity_type,
        entity_id = created.entity_id,
        size_bytes = created.size_bytes,
        user_id = user.user_id,
        "Document uploaded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/documents/{id}/download
///
/// Streams the stored blob with its original filename and MIME type.
pub async fn download_document(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;

    let path = blob_path(&state.config.upload_dir, &document.storage_key);
    let data = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(document_id = id, error = %e, "Document blob missing");
        AppError::InternalError("Stored file is unavailable".to_string())
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&document.mime_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    // Upload rejects quotes and control characters, but rows predating
    // that check are scrubbed again before the name reaches the header.
    let safe_name: String = document
        .file_name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let disposition = format!("attachment; filename=\"{safe_name}\"");
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or(HeaderValue::from_static("attachment")),
    );
    Ok((headers, data))
}

/// DELETE /api/v1/documents/{id}
///
/// Hard delete: the row goes first, then the blob. A blob that fails to
/// unlink is logged and left for cleanup; the API still reports success
/// because the document is gone from every listing.
pub async fn delete_document(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;

    if !DocumentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }));
    }

    let path = blob_path(&state.config.upload_dir, &document.storage_key);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(document_id = id, error = %e, "Failed to remove document blob");
    }

    tracing::info!(document_id = id, user_id = user.user_id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
