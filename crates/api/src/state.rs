use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Built once in `main` and cheaply cloneable; there is no global
/// accessor, the pool travels with the state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stocktake_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
