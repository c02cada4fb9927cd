//! Route definitions for user administration, mounted under `/users`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// GET    /                 -> list_users (admin)
/// POST   /                 -> create_user (admin)
/// POST   /export/{format}  -> export_users (admin)
/// GET    /{id}             -> get_user (admin)
/// PUT    /{id}             -> update_user (admin)
/// DELETE /{id}             -> delete_user (admin; disables the account)
/// PUT    /{id}/password    -> change_password (self or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/export/{format}", post(users::export_users))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/password", put(users::change_password))
}
