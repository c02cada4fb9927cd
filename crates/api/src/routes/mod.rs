pub mod assets;
pub mod auth;
pub mod companies;
pub mod documents;
pub mod health;
pub mod licenses;
pub mod places;
pub mod users;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                   login (public)
/// /auth/me                                      current user profile
///
/// /assets                                       list, create
/// /assets/import                                CSV import (POST)
/// /assets/export/{format}                       filtered export (POST)
/// /assets/{id}                                  get, update, soft-delete
/// /assets/{id}/restore                          restore (PUT)
/// /assets/{id}/movements                        history list, record movement
/// /assets/{id}/movements/{movement_id}/receive  confirm receipt (PUT)
/// /assets/{id}/movements/export/{format}        history export (POST)
///
/// /licenses                                     list, create
/// /licenses/import                              CSV import (POST)
/// /licenses/export/{format}                     filtered export (POST)
/// /licenses/{id}                                get, update, soft-delete
/// /licenses/{id}/restore                        restore (PUT)
///
/// /users                                        list, create (admin only)
/// /users/export/{format}                        export (POST, admin only)
/// /users/{id}                                   get, update, disable
/// /users/{id}/password                          change password (self or admin)
///
/// /companies                                    list, create
/// /companies/export/{format}                    filtered export (POST)
/// /companies/{id}                               get, update, soft-delete
/// /companies/{id}/restore                       restore (PUT)
///
/// /sections                                     list, create
/// /sections/export/{format}                     filtered export (POST)
/// /sections/{id}                                get, update, soft-delete
/// /sections/{id}/restore                        restore (PUT)
///
/// /locations                                    list, create
/// /locations/export/{format}                    filtered export (POST)
/// /locations/{id}                               get, update, soft-delete
/// /locations/{id}/restore                       restore (PUT)
///
/// /documents                                    list
/// /documents/upload                             upload (POST, multipart)
/// /documents/{id}                               get, hard-delete
/// /documents/{id}/download                      stream the stored blob
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Authentication (login is the one public endpoint).
        .nest("/auth", auth::router())
        // Fixed assets with their movement history.
        .nest("/assets", assets::router())
        // Software licenses with derived status.
        .nest("/licenses", licenses::router())
        // User administration.
        .nest("/users", users::router())
        // Supplier companies.
        .nest("/companies", companies::router())
        // Physical places: sections and the locations inside them.
        .nest("/sections", places::section_router())
        .nest("/locations", places::location_router())
        // File attachments.
        .nest("/documents", documents::router(config.max_upload_bytes))
}
