//! Route definitions for sections and locations.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::places;
use crate::state::AppState;

/// Section routes, mounted under `/sections`.
///
/// ```text
/// GET    /              -> list_sections
/// POST   /              -> create_section (manager)
/// GET    /{id}          -> get_section
/// PUT    /{id}          -> update_section (manager)
/// DELETE /{id}          -> delete_section (manager)
/// PUT    /{id}/restore  -> restore_section (manager)
/// POST   /export/{format} -> export_sections
/// ```
pub fn section_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(places::list_sections).post(places::create_section),
        )
        .route("/export/{format}", post(places::export_sections))
        .route(
            "/{id}",
            get(places::get_section)
                .put(places::update_section)
                .delete(places::delete_section),
        )
        .route("/{id}/restore", put(places::restore_section))
}

/// Location routes, mounted under `/locations`. Locations are listed
/// flat with their section name rather than nested under sections.
///
/// ```text
/// GET    /              -> list_locations
/// POST   /              -> create_location (manager)
/// GET    /{id}          -> get_location
/// PUT    /{id}          -> update_location (manager)
/// DELETE /{id}          -> delete_location (manager)
/// PUT    /{id}/restore  -> restore_location (manager)
/// POST   /export/{format} -> export_locations
/// ```
pub fn location_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(places::list_locations).post(places::create_location),
        )
        .route("/export/{format}", post(places::export_locations))
        .route(
            "/{id}",
            get(places::get_location)
                .put(places::update_location)
                .delete(places::delete_location),
        )
        .route("/{id}/restore", put(places::restore_location))
}
