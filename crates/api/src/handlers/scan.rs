//! Handlers for the `/scans` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use wheelway_core::scan::{
    validate_scan_description, validate_scan_location, validate_scan_name, ScanStatus,
};
use wheelway_core::types::{DbId, Timestamp};
use wheelway_core::CoreError;
use wheelway_db::models::scan::{CreateScan, Scan, UpdateScan};
use wheelway_db::repositories::{
    AnalysisRepo, GuideRepo, ScanImageRepo, ScanRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::image::{barrier_counts_by_image, ImageResponse};
use crate::handlers::require_scan;
use crate::state::AppState;

/// Default page size for scan listing.
const DEFAULT_LIMIT: i64 = 20;

/// Maximum page size for scan listing.
const MAX_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Query and response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /scans`.
#[derive(Debug, Deserialize)]
pub struct ScanListQuery {
    /// Restrict the listing to scans in this lifecycle status.
    pub status: Option<String>,
    /// Page size, defaulting to 20 and capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip.
    pub offset: Option<i64>,
}

/// A scan row with its image count attached.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub image_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScanResponse {
    fn new(scan: Scan, image_count: i64) -> Self {
        Self {
            id: scan.id,
            name: scan.name,
            description: scan.description,
            location: scan.location,
            status: scan.status,
            image_count,
            created_at: scan.created_at,
            updated_at: scan.updated_at,
        }
    }
}

/// One page of scans.
#[derive(Debug, Serialize)]
pub struct ScanListResponse {
    pub items: Vec<ScanResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Condensed analysis result embedded in the scan detail.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub status: String,
    pub total_barriers_found: i32,
    pub accessibility_score: Option<f64>,
}

/// Full scan detail: the scan, its images, and derived-result pointers.
#[derive(Debug, Serialize)]
pub struct ScanDetailResponse {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub images: Vec<ImageResponse>,
    pub analysis_result: Option<AnalysisSummary>,
    pub has_guide: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scans
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateScan>,
) -> AppResult<(StatusCode, Json<ScanResponse>)> {
    validate_scan_name(&input.name)?;
    validate_scan_description(input.description.as_deref())?;
    validate_scan_location(input.location.as_deref())?;

    let scan = ScanRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(ScanResponse::new(scan, 0))))
}

/// GET /api/v1/scans
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ScanListQuery>,
) -> AppResult<Json<ScanListResponse>> {
    let status = params
        .status
        .as_deref()
        .map(ScanStatus::from_str)
        .transpose()?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let scans = ScanRepo::list(&state.pool, status, limit, offset).await?;
    let total = ScanRepo::count(&state.pool, status).await?;

    let ids: Vec<DbId> = scans.iter().map(|scan| scan.id).collect();
    let counts: HashMap<DbId, i64> = ScanImageRepo::counts_for_scans(&state.pool, &ids)
        .await?
        .into_iter()
        .collect();

    let items = scans
        .into_iter()
        .map(|scan| {
            let image_count = counts.get(&scan.id).copied().unwrap_or(0);
            ScanResponse::new(scan, image_count)
        })
        .collect();

    Ok(Json(ScanListResponse {
        items,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/scans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ScanDetailResponse>> {
    let scan = require_scan(&state.pool, id).await?;

    let images = ScanImageRepo::list_by_scan(&state.pool, id).await?;
    let counts = barrier_counts_by_image(&state.pool, id).await?;
    let images = images
        .into_iter()
        .map(|image| {
            let barrier_count = counts.get(&image.id).copied().unwrap_or(0);
            ImageResponse::new(id, image, barrier_count)
        })
        .collect();

    let analysis_result = AnalysisRepo::find_for_scan(&state.pool, id)
        .await?
        .map(|analysis| AnalysisSummary {
            status: analysis.status,
            total_barriers_found: analysis.total_barriers_found,
            accessibility_score: analysis.accessibility_score,
        });
    let has_guide = GuideRepo::exists_for_scan(&state.pool, id).await?;

    Ok(Json(ScanDetailResponse {
        id: scan.id,
        name: scan.name,
        description: scan.description,
        location: scan.location,
        status: scan.status,
        created_at: scan.created_at,
        updated_at: scan.updated_at,
        images,
        analysis_result,
        has_guide,
    }))
}

/// PATCH /api/v1/scans/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScan>,
) -> AppResult<Json<ScanResponse>> {
    if let Some(name) = input.name.as_deref() {
        validate_scan_name(name)?;
    }
    validate_scan_description(input.description.as_deref())?;
    validate_scan_location(input.location.as_deref())?;

    let scan = ScanRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Scan", id }))?;

    let image_count = ScanImageRepo::count_by_scan(&state.pool, id).await?;
    Ok(Json(ScanResponse::new(scan, image_count)))
}

/// DELETE /api/v1/scans/{id}
///
/// Drops the row (images, barriers, analysis, and guide cascade) and
/// best-effort removes the scan's upload directory.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ScanRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Scan", id }));
    }

    let upload_dir = state.config.scan_upload_dir(id);
    if let Err(err) = tokio::fs::remove_dir_all(&upload_dir).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(scan_id = id, error = %err, "Could not remove scan upload directory");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
