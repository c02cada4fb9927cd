//! Route definitions for documents, mounted under `/documents`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// ```text
/// GET    /                -> list_documents (?entity_type&entity_id)
/// POST   /upload          -> upload_document (manager, multipart)
/// GET    /{id}            -> get_document
/// GET    /{id}/download   -> download_document
/// DELETE /{id}            -> delete_document (manager)
/// ```
///
/// The multipart upload is capped at `max_upload_bytes` before any
/// buffering happens.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list_documents))
        .route(
            "/upload",
            post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/{id}/download", get(documents::download_document))
}
