//! HTTP-level integration tests for scan image upload, listing, reordering,
//! file serving, and deletion.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, delete, get, post_json, post_multipart, tiny_png};
use sqlx::PgPool;
use wheelway_db::models::image::CreateScanImage;
use wheelway_db::repositories::ScanImageRepo;

/// Create a scan over HTTP and return its id.
async fn create_scan(pool: &PgPool, name: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(app, "/api/v1/scans", serde_json::json!({"name": name})).await,
    )
    .await;
    created["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_to_unknown_scan_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let png = tiny_png();
    let response = post_multipart(
        app,
        "/api/v1/scans/999999/images",
        &[("photo.png", "image/png", &png)],
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_two_images_marks_scan_ready(pool: PgPool) {
    let scan_id = create_scan(&pool, "Uploads").await;
    let png = tiny_png();

    let app = common::build_test_app(pool.clone());
    let response = post_multipart(
        app,
        &format!("/api/v1/scans/{scan_id}/images"),
        &[
            ("entrance.png", "image/png", &png),
            ("hallway.png", "image/png", &png),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["uploaded"], 2);
    assert_eq!(json["failed"], 0);

    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["original_filename"], "entrance.png");
    assert_eq!(images[0]["sequence_order"], 0);
    assert_eq!(images[1]["sequence_order"], 1);
    // The 1x1 test PNG's dimensions are probed on upload.
    assert_eq!(images[0]["width"], 1);
    assert_eq!(images[0]["height"], 1);

    let app = common::build_test_app(pool);
    let scan = body_json(get(app, &format!("/api/v1/scans/{scan_id}")).await).await;
    assert_eq!(scan["status"], "ready");
    assert_eq!(scan["image_count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_rejects_unsupported_content_type_per_file(pool: PgPool) {
    let scan_id = create_scan(&pool, "Mixed upload").await;
    let png = tiny_png();

    let app = common::build_test_app(pool);
    let response = post_multipart(
        app,
        &format!("/api/v1/scans/{scan_id}/images"),
        &[
            ("good.png", "image/png", &png),
            ("notes.txt", "text/plain", b"not an image"),
        ],
    )
    .await;

    // The valid file still lands; the bad one is reported, not fatal.
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["uploaded"], 1);
    assert_eq!(json["failed"], 1);

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("notes.txt"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_to_full_scan_returns_400(pool: PgPool) {
    let scan_id = create_scan(&pool, "Full scan").await;

    // Fill the scan to the configured cap directly through the repository.
    for order in 0..20 {
        let input = CreateScanImage {
            scan_id,
            file_path: format!("/tmp/wheelway-tests/full/{order}.png"),
            original_filename: Some(format!("{order}.png")),
            content_type: Some("image/png".to_string()),
            file_size_bytes: Some(100),
            width: Some(1),
            height: Some(1),
            sequence_order: order,
        };
        ScanImageRepo::create(&pool, &input).await.unwrap();
    }

    let app = common::build_test_app(pool);
    let png = tiny_png();
    let response = post_multipart(
        app,
        &format!("/api/v1/scans/{scan_id}/images"),
        &[("overflow.png", "image/png", &png)],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("maximum"));
}

// ---------------------------------------------------------------------------
// Listing and file serving
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_images_for_unknown_scan_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/scans/999999/images").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_serve_file_roundtrip(pool: PgPool) {
    let scan_id = create_scan(&pool, "File serving").await;
    let png = tiny_png();

    let app = common::build_test_app(pool.clone());
    let uploaded = body_json(
        post_multipart(
            app,
            &format!("/api/v1/scans/{scan_id}/images"),
            &[("photo.png", "image/png", &png)],
        )
        .await,
    )
    .await;
    let image_id = uploaded["images"][0]["id"].as_i64().unwrap();
    let url = uploaded["images"][0]["url"].as_str().unwrap().to_string();
    assert_eq!(
        url,
        format!("/api/v1/scans/{scan_id}/images/{image_id}/file")
    );

    let app = common::build_test_app(pool);
    let response = get(app, &url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );

    let bytes = body_bytes(response).await;
    assert_eq!(bytes, png);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_serve_file_for_unknown_image_returns_404(pool: PgPool) {
    let scan_id = create_scan(&pool, "No such image").await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/scans/{scan_id}/images/999999/file")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reorder_images(pool: PgPool) {
    let scan_id = create_scan(&pool, "Reorder").await;
    let png = tiny_png();

    let app = common::build_test_app(pool.clone());
    let uploaded = body_json(
        post_multipart(
            app,
            &format!("/api/v1/scans/{scan_id}/images"),
            &[
                ("first.png", "image/png", &png),
                ("second.png", "image/png", &png),
            ],
        )
        .await,
    )
    .await;
    let first = uploaded["images"][0]["id"].as_i64().unwrap();
    let second = uploaded["images"][1]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/scans/{scan_id}/images/reorder"),
        serde_json::json!([second, first]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);

    // An id list that does not match the scan's images is rejected.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/scans/{scan_id}/images/reorder"),
        serde_json::json!([first]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_last_image_drops_scan_to_pending(pool: PgPool) {
    let scan_id = create_scan(&pool, "Emptied").await;
    let png = tiny_png();

    let app = common::build_test_app(pool.clone());
    let uploaded = body_json(
        post_multipart(
            app,
            &format!("/api/v1/scans/{scan_id}/images"),
            &[("only.png", "image/png", &png)],
        )
        .await,
    )
    .await;
    let image_id = uploaded["images"][0]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/scans/{scan_id}/images/{image_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let scan = body_json(get(app, &format!("/api/v1/scans/{scan_id}")).await).await;
    assert_eq!(scan["status"], "pending");
    assert_eq!(scan["image_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unknown_image_returns_404(pool: PgPool) {
    let scan_id = create_scan(&pool, "Nothing to delete").await;

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/scans/{scan_id}/images/999999")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
