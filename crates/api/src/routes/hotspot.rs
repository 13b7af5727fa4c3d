use axum::routing::{post, put};
use axum::Router;

use crate::handlers::hotspot;
use crate::state::AppState;

/// Hotspot routes.
///
/// ```text
/// POST   /api/hotspots/create/  create
/// PUT    /api/hotspots/{id}/    update
/// DELETE /api/hotspots/{id}/    delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hotspots/create/", post(hotspot::create))
        .route(
            "/api/hotspots/{id}/",
            put(hotspot::update).delete(hotspot::delete),
        )
}
