//! Shared helpers for API integration tests.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use wheelway_api::config::ServerConfig;
use wheelway_api::engine::ActiveAnalyses;
use wheelway_api::router::build_app_router;
use wheelway_api::state::AppState;
use wheelway_vision::{VisionClient, VisionConfig};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and a unique temporary upload directory
/// per call so parallel tests never share files.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: std::env::temp_dir()
            .join("wheelway-tests")
            .join(uuid::Uuid::new_v4().to_string()),
        max_upload_size_mb: 10,
        max_images_per_scan: 20,
        vision: VisionConfig::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through `build_app_router`, so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery, body limit) that production uses. The vision client points at
/// the default endpoint with no API key; tests never let an analysis reach
/// the network.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let vision = VisionClient::new(config.vision.clone()).expect("Failed to build vision client");

    let state = AppState {
        pool,
        config: Arc::new(config),
        vision: Arc::new(vision),
        analyses: Arc::new(ActiveAnalyses::default()),
    };

    build_app_router(state)
}

/// Send a GET request to the given path.
pub async fn get(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with an empty body.
pub async fn post_empty(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PATCH request with a JSON body.
pub async fn patch_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request to the given path.
pub async fn delete(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a multipart POST with one part per `(filename, content_type, bytes)`
/// triple, all under the field name `files`.
pub async fn post_multipart(app: Router, path: &str, parts: &[(&str, &str, &[u8])]) -> Response {
    let boundary = "wheelway-test-boundary";

    let mut body = Vec::new();
    for (filename, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read the response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read the raw response body bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// A valid 1x1 PNG, small enough to inline into multipart bodies.
pub fn tiny_png() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::RgbaImage::new(1, 1)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
