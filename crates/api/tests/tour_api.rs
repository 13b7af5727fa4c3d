//! HTTP-level integration tests for the tour endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, create_scene, create_tour, delete, get, image_bytes, post_json, put_json,
    send_multipart, MultipartBody, TestApp,
};
use serde_json::json;
use sqlx::PgPool;

fn titles(json: &serde_json::Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_tour_returns_201_with_detail(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = post_json(
        app.router(),
        "/api/tours/create/",
        json!({"title": "Museum", "description": "Ground floor"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_number());
    assert_eq!(json["title"], "Museum");
    assert_eq!(json["description"], "Ground floor");
    assert_eq!(json["is_active"], true);
    assert_eq!(json["scene_count"], 0);
    assert!(json["thumbnail"].is_null());
    assert!(json["first_scene"].is_null());
    assert_eq!(json["scenes"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_tour_with_blank_title_fails(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = post_json(app.router(), "/api/tours/create/", json!({"title": "   "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["title"][0], "This field may not be blank.");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_tour_without_title_reports_required(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = post_json(
        app.router(),
        "/api/tours/create/",
        json!({"description": "No title"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["title"][0], "This field is required.");
    assert_eq!(json["fields"]["title"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_tour_with_wrongly_typed_flag_reports_field(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = post_json(
        app.router(),
        "/api/tours/create/",
        json!({"title": "Museum", "is_active": "maybe"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["is_active"][0], "Must be a valid boolean.");
    assert!(json["fields"].get("title").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_tour_with_long_title_fails(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = post_json(
        app.router(),
        "/api/tours/create/",
        json!({"title": "x".repeat(201)}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["title"].is_array());
}

// ---------------------------------------------------------------------------
// List and detail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_includes_only_active_tours(pool: PgPool) {
    let app = TestApp::new(pool);
    create_tour(&app, "Visible").await;
    let hidden = create_tour(&app, "Hidden").await;
    let response = put_json(
        app.router(),
        &format!("/api/tours/{hidden}/"),
        json!({"is_active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app.router(), "/api/tours/").await).await;
    assert_eq!(titles(&json), vec!["Visible"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_reports_scene_count_and_first_scene(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let second = create_scene(&app, tour, "Hall", 2).await;
    let first = create_scene(&app, tour, "Lobby", 1).await;

    let json = body_json(get(app.router(), "/api/tours/").await).await;
    let item = &json[0];
    assert_eq!(item["scene_count"], 2);
    assert_eq!(item["first_scene"], first);
    assert_ne!(item["first_scene"], second);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_search_and_ordering(pool: PgPool) {
    let app = TestApp::new(pool);
    let museum = create_tour(&app, "Museum").await;
    create_tour(&app, "Campus").await;
    create_tour(&app, "Old Museum").await;
    create_scene(&app, museum, "Lobby", 0).await;

    let json = body_json(get(app.router(), "/api/tours/?search=museum&ordering=title").await).await;
    assert_eq!(titles(&json), vec!["Museum", "Old Museum"]);

    let json = body_json(get(app.router(), "/api/tours/?ordering=-scene_count,title").await).await;
    assert_eq!(titles(&json), vec!["Museum", "Campus", "Old Museum"]);

    // Unknown ordering terms are ignored.
    let response = get(app.router(), "/api/tours/?ordering=password").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tour_detail_nests_active_scenes(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let lobby = create_scene(&app, tour, "Lobby", 0).await;
    let hall = create_scene(&app, tour, "Hall", 1).await;

    let form = MultipartBody::new().text("is_active", "false");
    let response = send_multipart(
        app.router(),
        Method::PUT,
        &format!("/api/scenes/{hall}/"),
        form,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app.router(), &format!("/api/tours/{tour}/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["scene_count"], 2);
    assert_eq!(json["scenes"].as_array().unwrap().len(), 1);
    assert_eq!(json["scenes"][0]["id"], lobby);
    assert_eq!(json["first_scene"]["id"], lobby);
    assert_eq!(json["first_scene"]["title"], "Lobby");
    let pano = json["first_scene"]["panorama_image"].as_str().unwrap();
    assert!(pano.starts_with("/media/scenes/panoramas/"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn inactive_or_missing_tour_detail_returns_404(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Closed").await;
    put_json(
        app.router(),
        &format!("/api/tours/{tour}/"),
        json!({"is_active": false}),
    )
    .await;

    let response = get(app.router(), &format!("/api/tours/{tour}/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Tour not found");

    let response = get(app.router(), "/api/tours/999999/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn scene_list_of_unknown_tour_is_empty(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = get(app.router(), "/api/tours/999999/scenes/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_can_reactivate_tour(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Seasonal").await;
    let uri = format!("/api/tours/{tour}/");

    let json = body_json(put_json(app.router(), &uri, json!({"is_active": false})).await).await;
    assert_eq!(json["is_active"], false);

    let response = put_json(
        app.router(),
        &uri,
        json!({"is_active": true, "title": "Summer"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["is_active"], true);
    assert_eq!(json["title"], "Summer");
    assert_eq!(json["description"], "Seasonal tour");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_missing_tour_returns_404(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = put_json(app.router(), "/api/tours/999999/", json!({"title": "Nope"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Thumbnail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn thumbnail_upload_resolves_url_and_replaces_file(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let uri = format!("/api/tours/{tour}/thumbnail/");

    let form = MultipartBody::new().file("thumbnail", "cover.png", "image/png", &image_bytes());
    let response = send_multipart(app.router(), Method::PUT, &uri, form).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let url = json["thumbnail"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/tours/thumbnails/"));
    assert!(url.ends_with(".png"));
    assert_eq!(app.stored_files(), 1);

    // The stored file is served back under the media prefix.
    let served = get(app.router(), &url).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(common::body_bytes(served).await, image_bytes());

    let form = MultipartBody::new().file("thumbnail", "cover2.jpg", "image/jpeg", &image_bytes());
    let json = body_json(send_multipart(app.router(), Method::PUT, &uri, form).await).await;
    assert_ne!(json["thumbnail"].as_str().unwrap(), url);
    assert_eq!(app.stored_files(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn thumbnail_must_be_an_image(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;

    let form = MultipartBody::new().file("thumbnail", "notes.pdf", "application/pdf", b"%PDF");
    let response = send_multipart(
        app.router(),
        Method::PUT,
        &format!("/api/tours/{tour}/thumbnail/"),
        form,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["fields"]["thumbnail"][0],
        "Only image files are allowed for the thumbnail."
    );
    assert_eq!(app.stored_files(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn thumbnail_for_missing_tour_leaves_no_file(pool: PgPool) {
    let app = TestApp::new(pool);
    let form = MultipartBody::new().file("thumbnail", "cover.png", "image/png", &image_bytes());
    let response = send_multipart(app.router(), Method::PUT, "/api/tours/999999/thumbnail/", form).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.stored_files(), 0);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_tour_cascades_and_removes_media(pool: PgPool) {
    let app = TestApp::new(pool);
    let tour = create_tour(&app, "Museum").await;
    let lobby = create_scene(&app, tour, "Lobby", 0).await;
    create_scene(&app, tour, "Hall", 1).await;
    assert_eq!(app.stored_files(), 2);

    let response = delete(app.router(), &format!("/api/tours/{tour}/")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.stored_files(), 0);

    let response = get(app.router(), &format!("/api/scenes/{lobby}/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app.router(), &format!("/api/tours/{tour}/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
