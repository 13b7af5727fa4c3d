pub mod health;
pub mod hotspot;
pub mod scene;
pub mod tour;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Every path keeps its trailing slash, so the trees are merged with full
/// paths rather than nested.
///
/// ```text
/// /api/                                  capability listing
/// /api/health/                           liveness probe
///
/// /api/tours/                            list (search, ordering)
/// /api/tours/create/                     create
/// /api/tours/{id}/                       get, update, delete
/// /api/tours/{id}/thumbnail/             replace thumbnail (multipart)
/// /api/tours/{tour_id}/scenes/           active scenes
/// /api/tours/{tour_id}/navigation/       navigation graph
///
/// /api/scenes/create/                    create (multipart)
/// /api/scenes/{id}/                      get, update (multipart), delete
/// /api/scenes/{scene_id}/hotspots/       active hotspots
///
/// /api/hotspots/create/                  create
/// /api/hotspots/{id}/                    update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(tour::router())
        .merge(scene::router())
        .merge(hotspot::router())
}
