use std::sync::Arc;

use vrtour_core::media::MediaStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vrtour_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Where uploaded media is written and how its URLs are resolved.
    pub media: Arc<dyn MediaStore>,
}
