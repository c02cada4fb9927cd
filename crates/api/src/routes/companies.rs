//! Route definitions for supplier companies, mounted under `/companies`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::companies;
use crate::state::AppState;

/// ```text
/// GET    /                  -> list_companies
/// POST   /                  -> create_company (manager)
/// GET    /{id}              -> get_company
/// PUT    /{id}              -> update_company (manager)
/// DELETE /{id}              -> delete_company (manager)
/// PUT    /{id}/restore      -> restore_company (manager)
/// POST   /export/{format}   -> export_companies
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(companies::list_companies).post(companies::create_company),
        )
        .route("/export/{format}", post(companies::export_companies))
        .route(
            "/{id}",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::delete_company),
        )
        .route("/{id}/restore", put(companies::restore_company))
}
