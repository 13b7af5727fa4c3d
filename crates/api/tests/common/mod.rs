#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use vrtour_api::config::ServerConfig;
use vrtour_api::media_store::LocalMediaStore;
use vrtour_api::router::build_app_router;
use vrtour_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults, storing media under
/// `media_root`.
pub fn test_config(media_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        media_root: media_root.to_string_lossy().into_owned(),
        media_url: "/media/".to_string(),
        max_upload_bytes: 64 * 1024 * 1024,
    }
}

/// Build the full application router on `pool`, the same way `main.rs` does.
pub fn build_test_app(pool: PgPool, media_root: &Path) -> Router {
    let config = test_config(media_root);
    let media = LocalMediaStore::new(media_root, config.media_url.clone());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        media: Arc::new(media),
    };
    build_app_router(state, &config)
}

/// A database pool plus a scratch media directory that lives as long as the
/// test.
pub struct TestApp {
    pub pool: PgPool,
    pub media_dir: TempDir,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            media_dir: tempfile::tempdir().unwrap(),
        }
    }

    /// A fresh router; `oneshot` consumes it, so take one per request.
    pub fn router(&self) -> Router {
        build_test_app(self.pool.clone(), self.media_dir.path())
    }

    pub fn media_root(&self) -> &Path {
        self.media_dir.path()
    }

    /// Number of files stored under the media root.
    pub fn stored_files(&self) -> usize {
        count_files(self.media_dir.path())
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a `multipart/form-data` request.
pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    form: MultipartBody,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", form.content_type())
        .body(Body::from(form.finish()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "vrtour-test-boundary";

/// Minimal `multipart/form-data` encoder.
#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{}\r\n",
                value.to_string()
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

/// A few bytes standing in for an image; only the declared type is checked.
pub fn image_bytes() -> Vec<u8> {
    b"\x89PNG\r\n\x1a\n-panorama-".to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a tour through the API and return its id.
pub async fn create_tour(app: &TestApp, title: &str) -> i64 {
    let response = post_json(
        app.router(),
        "/api/tours/create/",
        serde_json::json!({ "title": title, "description": format!("{title} tour") }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a scene with a panorama through the API and return its id.
pub async fn create_scene(app: &TestApp, tour_id: i64, title: &str, order: i32) -> i64 {
    let form = MultipartBody::new()
        .text("tour", tour_id)
        .text("title", title)
        .text("order", order)
        .file("panorama_image", "pano.png", "image/png", &image_bytes());
    let response = send_multipart(app.router(), Method::POST, "/api/scenes/create/", form).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a hotspot through the API and return its id.
pub async fn create_hotspot(app: &TestApp, source: i64, target: i64, yaw: f64) -> i64 {
    let response = post_json(
        app.router(),
        "/api/hotspots/create/",
        serde_json::json!({
            "source_scene": source,
            "target_scene": target,
            "yaw": yaw,
            "pitch": 0.0,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
