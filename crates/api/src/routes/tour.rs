use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::tour;
use crate::state::AppState;

/// Tour routes.
///
/// ```text
/// GET    /api/tours/                       list
/// POST   /api/tours/create/                create
/// GET    /api/tours/{id}/                  get_by_id
/// PUT    /api/tours/{id}/                  update
/// DELETE /api/tours/{id}/                  delete
/// PUT    /api/tours/{id}/thumbnail/        replace_thumbnail
/// GET    /api/tours/{tour_id}/scenes/      list_scenes
/// GET    /api/tours/{tour_id}/navigation/  navigation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tours/", get(tour::list))
        .route("/api/tours/create/", post(tour::create))
        .route(
            "/api/tours/{id}/",
            get(tour::get_by_id).put(tour::update).delete(tour::delete),
        )
        .route("/api/tours/{id}/thumbnail/", put(tour::replace_thumbnail))
        .route("/api/tours/{id}/scenes/", get(tour::list_scenes))
        .route("/api/tours/{id}/navigation/", get(tour::navigation))
}
