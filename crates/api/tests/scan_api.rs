//! HTTP-level integration tests for scan CRUD endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Scan creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_scan_returns_201(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/scans",
        serde_json::json!({"name": "Cafe entrance", "location": "12 High Street"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Cafe entrance");
    assert_eq!(json["location"], "12 High Street");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["image_count"], 0);
    assert!(json["id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_scan_rejects_empty_name(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/scans", serde_json::json!({"name": "   "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_scan_rejects_oversized_description(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/scans",
        serde_json::json!({"name": "Okay", "description": "x".repeat(1001)}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Scan listing and pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_scans_paginates(pool: PgPool) {
    for i in 0..3 {
        let app = common::build_test_app(pool.clone());
        let response = post_json(
            app,
            "/api/v1/scans",
            serde_json::json!({"name": format!("Scan {i}")}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/scans?limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["limit"], 2);
    assert_eq!(json["offset"], 0);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/scans?limit=2&offset=2").await;
    let json = body_json(response).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_scans_filters_by_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/scans", serde_json::json!({"name": "Pending"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/scans?status=completed").await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["items"].as_array().unwrap().len(), 0);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/scans?status=pending").await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_scans_rejects_unknown_status(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/scans?status=bogus").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Scan detail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_scan_detail(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(
            app,
            "/api/v1/scans",
            serde_json::json!({"name": "Detail", "description": "Ground floor"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/scans/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "Detail");
    assert_eq!(json["description"], "Ground floor");
    assert_eq!(json["images"].as_array().unwrap().len(), 0);
    assert!(json["analysis_result"].is_null());
    assert_eq!(json["has_guide"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_nonexistent_scan_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/scans/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Scan update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_scan_updates_provided_fields(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(
            app,
            "/api/v1/scans",
            serde_json::json!({"name": "Original", "location": "Old address"}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        &format!("/api/v1/scans/{id}"),
        serde_json::json!({"name": "Renamed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "Renamed");
    // Fields not in the patch are untouched.
    assert_eq!(json["location"], "Old address");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_scan_rejects_empty_name(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(app, "/api/v1/scans", serde_json::json!({"name": "Valid"})).await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        &format!("/api/v1/scans/{id}"),
        serde_json::json!({"name": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_nonexistent_scan_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        "/api/v1/scans/999999",
        serde_json::json!({"name": "Ghost"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Scan deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_scan_returns_204(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(app, "/api/v1/scans", serde_json::json!({"name": "Delete me"})).await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/scans/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Subsequent GET should 404.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/scans/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_nonexistent_scan_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = delete(app, "/api/v1/scans/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
