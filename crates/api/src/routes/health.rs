use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness probe payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Capability listing payload.
#[derive(Serialize)]
pub struct ApiOverview {
    pub message: &'static str,
    pub version: &'static str,
    /// Path templates keyed by operation name.
    pub endpoints: Value,
}

/// GET /api/ -- lists what the API offers.
async fn api_overview() -> Json<ApiOverview> {
    Json(ApiOverview {
        message: "Welcome to VR Tours API",
        version: "1.0",
        endpoints: json!({
            "tours": "/api/tours/",
            "tour_detail": "/api/tours/{id}/",
            "tour_scenes": "/api/tours/{tour_id}/scenes/",
            "tour_navigation": "/api/tours/{tour_id}/navigation/",
            "scene_detail": "/api/scenes/{id}/",
            "scene_hotspots": "/api/scenes/{scene_id}/hotspots/",
            "create_tour": "/api/tours/create/",
            "create_scene": "/api/scenes/create/",
            "create_hotspot": "/api/hotspots/create/",
            "health": "/api/health/",
        }),
    })
}

/// GET /api/health/ -- liveness only; does not touch the database.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "VR Tours API is running",
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/", get(api_overview))
        .route("/api/health/", get(health_check))
}
