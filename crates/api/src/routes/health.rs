//! Health probe routes, mounted at the server root.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// ```text
/// GET /health        -> liveness
/// GET /health/ready  -> readiness (pings the database)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}
