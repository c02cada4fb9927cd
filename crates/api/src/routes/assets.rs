//! Route definitions for fixed assets, mounted under `/assets`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// ```text
/// GET    /                                      -> list_assets
/// POST   /                                      -> create_asset (manager)
/// POST   /import                                -> import_assets (manager)
/// POST   /export/{format}                       -> export_assets
/// GET    /{id}                                  -> get_asset (?include_deleted)
/// PUT    /{id}                                  -> update_asset (manager)
/// DELETE /{id}                                  -> delete_asset (manager)
/// PUT    /{id}/restore                          -> restore_asset (manager)
/// GET    /{id}/movements                        -> list_movements
/// POST   /{id}/movements                        -> create_movement (manager)
/// PUT    /{id}/movements/{movement_id}/receive  -> receive_movement
/// POST   /{id}/movements/export/{format}        -> export_movements
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/import", post(assets::import_assets))
        .route("/export/{format}", post(assets::export_assets))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/restore", put(assets::restore_asset))
        .route(
            "/{id}/movements",
            get(assets::list_movements).post(assets::create_movement),
        )
        .route(
            "/{id}/movements/{movement_id}/receive",
            put(assets::receive_movement),
        )
        .route(
            "/{id}/movements/export/{format}",
            post(assets::export_movements),
        )
}
