//! HTTP-level integration tests for the scene endpoints, including
//! multipart uploads and their media rules.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, create_hotspot, create_scene, create_tour, delete, get, image_bytes, put_json,
    send_multipart, MultipartBody, TestApp,
};
use serde_json::json;
use sqlx::PgPool;
use vrtour_core::media::MAX_PANORAMA_BYTES;
use vrtour_core::validation::{MSG_SCENE_LINKED, MSG_UNIQUE_ORDER, NON_FIELD_ERRORS};

async fn post_scene(app: &TestApp, form: MultipartBody) -> axum::http::Response<axum::body::Body> {
    send_multipart(app.router(), Method::POST, "/api/scenes/create/", form).await
}

async fn put_scene(
    app: &TestApp,
    id: i64,
    form: MultipartBody,
) -> axum::http::Response<axum::body::Body> {
    send_multipart(app.router(), Method::PUT, &format!("/api/scenes/{id}/"), form).await
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_scene_returns_201_with_defaults(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;

    let form = MultipartBody::new()
        .text("tour", tour)
        .text("title", "Lobby")
        .file("panorama_image", "lobby.jpg", "image/jpeg", &image_bytes())
        .file("voiceover_audio", "intro.mp3", "audio/mpeg", b"ID3");
    let response = post_scene(&app, form).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["tour"], tour);
    assert_eq!(json["tour_title"], "Museum");
    assert_eq!(json["title"], "Lobby");
    assert_eq!(json["description"], "");
    assert_eq!(json["initial_yaw"], 0.0);
    assert_eq!(json["initial_pitch"], 0.0);
    assert_eq!(json["order"], 0);
    assert_eq!(json["is_active"], true);
    assert_eq!(json["hotspot_count"], 0);
    assert_eq!(json["hotspots"], json!([]));
    assert!(json["map_image"].is_null());
    assert!(json["panorama_image"]
        .as_str()
        .unwrap()
        .starts_with("/media/scenes/panoramas/"));
    assert!(json["voiceover_audio"]
        .as_str()
        .unwrap()
        .starts_with("/media/scenes/audio/"));
    assert_eq!(app.stored_files(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_scene_reports_every_violation(pool: PgPool) {
    let app = TestApp::new(pool);

    let form = MultipartBody::new()
        .text("initial_yaw", "abc")
        .text("initial_pitch", "95")
        .text("order", "-1");
    let response = post_scene(&app, form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let fields = &json["fields"];
    assert_eq!(fields["tour"][0], "This field is required.");
    assert_eq!(fields["tour"].as_array().unwrap().len(), 1);
    assert!(fields.get("tour_id").is_none());
    assert_eq!(fields["title"][0], "This field is required.");
    assert_eq!(fields["initial_yaw"][0], "A valid number is required.");
    assert_eq!(
        fields["initial_pitch"][0],
        "Initial pitch must be between -90 and 90 degrees."
    );
    assert_eq!(fields["order"][0], "Order must be a non-negative integer.");
    assert_eq!(fields["panorama_image"][0], "No file was submitted.");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn panorama_size_limit_is_inclusive(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let limit = MAX_PANORAMA_BYTES as usize;

    let exact = vec![0u8; limit];
    let form = MultipartBody::new()
        .text("tour", tour)
        .text("title", "Exact")
        .text("order", 0)
        .file("panorama_image", "exact.jpg", "image/jpeg", &exact);
    let response = post_scene(&app, form).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let over = vec![0u8; limit + 1];
    let form = MultipartBody::new()
        .text("tour", tour)
        .text("title", "Over")
        .text("order", 1)
        .file("panorama_image", "over.jpg", "image/jpeg", &over);
    let response = post_scene(&app, form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["fields"]["panorama_image"][0],
        "Panorama image file size cannot exceed 10MB."
    );
    assert_eq!(app.stored_files(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn media_types_are_enforced(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;

    let form = MultipartBody::new()
        .text("tour", tour)
        .text("title", "Lobby")
        .file("panorama_image", "lobby.gif", "text/plain", b"GIF89a")
        .file("voiceover_audio", "intro.ogg", "audio/ogg", b"OggS");
    let response = post_scene(&app, form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["fields"]["panorama_image"][0],
        "Only image files are allowed for panorama."
    );
    assert_eq!(
        json["fields"]["voiceover_audio"][0],
        "Only MP3 and WAV audio files are allowed."
    );
    assert_eq!(app.stored_files(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_scene_for_missing_tour_is_integrity_error(pool: PgPool) {
    let app = TestApp::new(pool);

    let form = MultipartBody::new()
        .text("tour", 999999)
        .text("title", "Lost")
        .file("panorama_image", "lost.jpg", "image/jpeg", &image_bytes());
    let response = post_scene(&app, form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTEGRITY_ERROR");
    assert_eq!(
        json["fields"]["tour"][0],
        "Invalid pk \"999999\" - object does not exist."
    );
    assert_eq!(app.stored_files(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_order_is_integrity_error_and_discards_upload(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    create_scene(&app, tour, "Lobby", 1).await;

    let form = MultipartBody::new()
        .text("tour", tour)
        .text("title", "Also first")
        .text("order", 1)
        .file("panorama_image", "dup.jpg", "image/jpeg", &image_bytes());
    let response = post_scene(&app, form).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTEGRITY_ERROR");
    assert_eq!(json["fields"][NON_FIELD_ERRORS][0], MSG_UNIQUE_ORDER);
    assert_eq!(app.stored_files(), 1);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn scene_detail_nests_active_hotspots(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let lobby = create_scene(&app, tour, "Lobby", 0).await;
    let hall = create_scene(&app, tour, "Hall", 1).await;
    let garden = create_scene(&app, tour, "Garden", 2).await;
    let to_hall = create_hotspot(&app, lobby, hall, 30.0).await;
    let to_garden = create_hotspot(&app, lobby, garden, -60.0).await;

    let response = put_json(
        app.router(),
        &format!("/api/hotspots/{to_garden}/"),
        json!({"is_active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app.router(), &format!("/api/scenes/{lobby}/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["hotspot_count"], 2);
    let hotspots = json["hotspots"].as_array().unwrap();
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0]["id"], to_hall);
    assert_eq!(hotspots[0]["target_scene_title"], "Hall");
    assert_eq!(hotspots[0]["size"], 1.0);
    assert_eq!(hotspots[0]["color"], "#ffffff");

    let listed = body_json(get(app.router(), &format!("/api/scenes/{lobby}/hotspots/")).await).await;
    assert_eq!(listed, json["hotspots"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn scene_in_inactive_tour_is_hidden(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let lobby = create_scene(&app, tour, "Lobby", 0).await;

    put_json(
        app.router(),
        &format!("/api/tours/{tour}/"),
        json!({"is_active": false}),
    )
    .await;

    let response = get(app.router(), &format!("/api/scenes/{lobby}/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Scene not found");

    let json = body_json(get(app.router(), &format!("/api/tours/{tour}/scenes/")).await).await;
    assert_eq!(json, json!([]));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_replaces_panorama_and_removes_old_file(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let lobby = create_scene(&app, tour, "Lobby", 0).await;
    let before = body_json(get(app.router(), &format!("/api/scenes/{lobby}/")).await).await;

    let form = MultipartBody::new()
        .text("title", "Grand Lobby")
        .text("initial_yaw", "45.5")
        .file("panorama_image", "new.webp", "image/webp", &image_bytes());
    let response = put_scene(&app, lobby, form).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Grand Lobby");
    assert_eq!(json["initial_yaw"], 45.5);
    assert_eq!(json["order"], 0);
    assert_ne!(json["panorama_image"], before["panorama_image"]);
    assert!(json["panorama_image"].as_str().unwrap().ends_with(".webp"));
    assert_eq!(app.stored_files(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn linked_scene_cannot_change_tour(pool: PgPool) {
    let app = TestApp::new(pool);
    let museum = create_tour(&app, "Museum").await;
    let campus = create_tour(&app, "Campus").await;
    let lobby = create_scene(&app, museum, "Lobby", 0).await;
    let hall = create_scene(&app, museum, "Hall", 1).await;
    let loose = create_scene(&app, museum, "Loose", 2).await;
    create_hotspot(&app, lobby, hall, 0.0).await;

    let response = put_scene(&app, hall, MultipartBody::new().text("tour", campus)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["tour"][0], MSG_SCENE_LINKED);

    let response = put_scene(&app, loose, MultipartBody::new().text("tour", campus)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["tour"], campus);
    assert_eq!(json["tour_title"], "Campus");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_missing_scene_returns_404(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = put_scene(&app, 999999, MultipartBody::new().text("title", "Nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_scene_removes_hotspots_on_both_ends(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let lobby = create_scene(&app, tour, "Lobby", 0).await;
    let hall = create_scene(&app, tour, "Hall", 1).await;
    create_hotspot(&app, lobby, hall, 10.0).await;
    create_hotspot(&app, hall, lobby, -170.0).await;

    let response = delete(app.router(), &format!("/api/scenes/{hall}/")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.stored_files(), 1);

    let json = body_json(get(app.router(), &format!("/api/scenes/{lobby}/")).await).await;
    assert_eq!(json["hotspot_count"], 0);
    assert_eq!(json["hotspots"], json!([]));

    let response = delete(app.router(), &format!("/api/scenes/{hall}/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
