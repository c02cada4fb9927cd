//! Route definitions for software licenses, mounted under `/licenses`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::licenses;
use crate::state::AppState;

/// ```text
/// GET    /                  -> list_licenses
/// POST   /                  -> create_license (manager)
/// POST   /import            -> import_licenses (manager)
/// POST   /export/{format}   -> export_licenses
/// GET    /{id}              -> get_license (?include_deleted)
/// PUT    /{id}              -> update_license (manager)
/// DELETE /{id}              -> delete_license (manager)
/// PUT    /{id}/restore      -> restore_license (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(licenses::list_licenses).post(licenses::create_license),
        )
        .route("/import", post(licenses::import_licenses))
        .route("/export/{format}", post(licenses::export_licenses))
        .route(
            "/{id}",
            get(licenses::get_license)
                .put(licenses::update_license)
                .delete(licenses::delete_license),
        )
        .route("/{id}/restore", put(licenses::restore_license))
}
