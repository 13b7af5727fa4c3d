use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scene;
use crate::state::AppState;

/// Scene routes.
///
/// ```text
/// POST   /api/scenes/create/               create (multipart)
/// GET    /api/scenes/{id}/                 get_by_id
/// PUT    /api/scenes/{id}/                 update (multipart)
/// DELETE /api/scenes/{id}/                 delete
/// GET    /api/scenes/{scene_id}/hotspots/  list_hotspots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/scenes/create/", post(scene::create))
        .route(
            "/api/scenes/{id}/",
            get(scene::get_by_id)
                .put(scene::update)
                .delete(scene::delete),
        )
        .route("/api/scenes/{id}/hotspots/", get(scene::list_hotspots))
}
