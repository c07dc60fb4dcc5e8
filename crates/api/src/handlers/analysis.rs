//! Handlers for analysis runs and barrier queries.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use wheelway_core::barrier::{BarrierSeverity, BarrierType};
use wheelway_core::scan::AnalysisStatus;
use wheelway_core::types::DbId;
use wheelway_core::CoreError;
use wheelway_db::models::analysis::Analysis;
use wheelway_db::models::barrier::Barrier;
use wheelway_db::models::image::ScanImage;
use wheelway_db::repositories::{AnalysisRepo, BarrierRepo, ScanImageRepo};

use crate::engine;
use crate::error::{AppError, AppResult};
use crate::handlers::image::image_url;
use crate::handlers::require_scan;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response types
// ---------------------------------------------------------------------------

/// Body for `POST /scans/{scan_id}/analyze`. The whole body is optional.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Re-run even when a completed result exists, clearing stored barriers
    /// first.
    #[serde(default)]
    pub force: bool,
    /// Accepted and ignored; the run itself is profile-independent, and
    /// guides are tailored to a profile at generation time instead.
    #[serde(default)]
    pub wheelchair_profile_id: Option<DbId>,
}

/// Query parameters for barrier listing.
#[derive(Debug, Deserialize)]
pub struct BarrierListQuery {
    /// Restrict to one severity.
    pub severity: Option<String>,
    /// Restrict to one barrier type.
    #[serde(rename = "type")]
    pub barrier_type: Option<String>,
}

/// One stored barrier with its bounding box flattened.
#[derive(Debug, Serialize)]
pub struct BarrierResponse {
    pub id: DbId,
    pub image_id: DbId,
    pub barrier_type: String,
    pub severity: String,
    pub description: String,
    pub bbox_x: Option<f64>,
    pub bbox_y: Option<f64>,
    pub bbox_width: Option<f64>,
    pub bbox_height: Option<f64>,
    pub estimated_width_cm: Option<f64>,
    pub estimated_height_cm: Option<f64>,
    pub estimated_depth_cm: Option<f64>,
    pub recommendation: Option<String>,
    pub confidence: f64,
}

impl From<Barrier> for BarrierResponse {
    fn from(barrier: Barrier) -> Self {
        let bbox = barrier.bounding_box();
        Self {
            id: barrier.id,
            image_id: barrier.image_id,
            barrier_type: barrier.barrier_type,
            severity: barrier.severity,
            description: barrier.description,
            bbox_x: bbox.as_ref().map(|b| b.x),
            bbox_y: bbox.as_ref().map(|b| b.y),
            bbox_width: bbox.as_ref().map(|b| b.width),
            bbox_height: bbox.as_ref().map(|b| b.height),
            estimated_width_cm: barrier.estimated_width_cm,
            estimated_height_cm: barrier.estimated_height_cm,
            estimated_depth_cm: barrier.estimated_depth_cm,
            recommendation: barrier.recommendation,
            confidence: barrier.confidence,
        }
    }
}

/// Barrier counts bucketed by severity.
#[derive(Debug, Default, Serialize)]
pub struct SeverityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

/// Per-image barrier involvement, for images with at least one barrier.
#[derive(Debug, Serialize)]
pub struct ImageBarrierStats {
    pub image_id: DbId,
    pub image_url: String,
    pub sequence_order: i32,
    pub barrier_count: i64,
    pub max_severity: String,
}

/// The analysis row plus statistics derived from its stored barriers.
#[derive(Debug, Serialize)]
pub struct AnalysisDetailResponse {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub barriers_by_severity: SeverityCounts,
    pub barriers_by_type: BTreeMap<String, i64>,
    pub images_with_barriers: Vec<ImageBarrierStats>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scans/{scan_id}/analyze
///
/// Runs the analysis synchronously and answers 202 with the final analysis
/// row. A previously completed result is returned as-is unless `force` is
/// set; a concurrent run for the same scan is a 409.
pub async fn start(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
    body: Option<Json<AnalyzeRequest>>,
) -> AppResult<(StatusCode, Json<Analysis>)> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    require_scan(&state.pool, scan_id).await?;

    let images = ScanImageRepo::list_by_scan(&state.pool, scan_id).await?;
    if images.is_empty() {
        return Err(AppError::BadRequest(
            "Scan has no images to analyze".to_string(),
        ));
    }

    if let Some(existing) = AnalysisRepo::find_for_scan(&state.pool, scan_id).await? {
        let status = existing.run_status()?;
        if status == AnalysisStatus::InProgress {
            return Err(AppError::Core(CoreError::Conflict(
                "An analysis for this scan is already in progress".to_string(),
            )));
        }
        if status == AnalysisStatus::Completed && !request.force {
            return Ok((StatusCode::ACCEPTED, Json(existing)));
        }
    }

    let Some(token) = state.analyses.begin(scan_id).await else {
        return Err(AppError::Core(CoreError::Conflict(
            "An analysis for this scan is already in progress".to_string(),
        )));
    };

    let result = engine::run_analysis(&state, scan_id, &images, request.force, &token).await;
    state.analyses.finish(scan_id).await;

    Ok((StatusCode::ACCEPTED, Json(result?)))
}

/// POST /api/v1/scans/{scan_id}/analysis/cancel
///
/// Requests cancellation of the scan's running analysis; the run stops
/// before its next image and keeps the results gathered so far.
pub async fn cancel(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if !state.analyses.cancel(scan_id).await {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Running analysis for scan",
            id: scan_id,
        }));
    }

    tracing::info!(scan_id, "Analysis cancellation requested");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Analysis cancellation requested" })),
    ))
}

/// GET /api/v1/scans/{scan_id}/analysis
pub async fn get_result(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<Json<AnalysisDetailResponse>> {
    require_scan(&state.pool, scan_id).await?;

    let analysis = AnalysisRepo::find_for_scan(&state.pool, scan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Analysis for scan",
            id: scan_id,
        }))?;

    let barriers = BarrierRepo::list_by_scan(&state.pool, scan_id, None, None).await?;
    let images = ScanImageRepo::list_by_scan(&state.pool, scan_id).await?;

    Ok(Json(build_detail(analysis, scan_id, &barriers, &images)))
}

/// GET /api/v1/scans/{scan_id}/analysis/barriers
pub async fn list_scan_barriers(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
    Query(params): Query<BarrierListQuery>,
) -> AppResult<Json<Vec<BarrierResponse>>> {
    require_scan(&state.pool, scan_id).await?;

    let severity = params
        .severity
        .as_deref()
        .map(BarrierSeverity::from_str)
        .transpose()?;
    let barrier_type = params
        .barrier_type
        .as_deref()
        .map(BarrierType::from_str)
        .transpose()?;

    let barriers = BarrierRepo::list_by_scan(&state.pool, scan_id, severity, barrier_type).await?;
    Ok(Json(barriers.into_iter().map(BarrierResponse::from).collect()))
}

/// GET /api/v1/images/{image_id}/barriers
///
/// Unknown image ids yield an empty list rather than a 404.
pub async fn list_image_barriers(
    State(state): State<AppState>,
    Path(image_id): Path<DbId>,
) -> AppResult<Json<Vec<BarrierResponse>>> {
    let barriers = BarrierRepo::list_by_image(&state.pool, image_id).await?;
    Ok(Json(barriers.into_iter().map(BarrierResponse::from).collect()))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Fold the stored barriers into per-severity, per-type, and per-image
/// statistic blocks. `images` must already be in sequence order.
fn build_detail(
    analysis: Analysis,
    scan_id: DbId,
    barriers: &[Barrier],
    images: &[ScanImage],
) -> AnalysisDetailResponse {
    let mut by_severity = SeverityCounts::default();
    let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
    let mut per_image: HashMap<DbId, (i64, BarrierSeverity)> = HashMap::new();

    for barrier in barriers {
        let severity = barrier.severity_level();
        match severity {
            BarrierSeverity::Low => by_severity.low += 1,
            BarrierSeverity::Medium => by_severity.medium += 1,
            BarrierSeverity::High => by_severity.high += 1,
            BarrierSeverity::Critical => by_severity.critical += 1,
        }
        *by_type.entry(barrier.barrier_type.clone()).or_insert(0) += 1;
        per_image
            .entry(barrier.image_id)
            .and_modify(|(count, worst)| {
                *count += 1;
                *worst = (*worst).max(severity);
            })
            .or_insert((1, severity));
    }

    let images_with_barriers = images
        .iter()
        .filter_map(|image| {
            per_image.get(&image.id).map(|(count, worst)| ImageBarrierStats {
                image_id: image.id,
                image_url: image_url(scan_id, image.id),
                sequence_order: image.sequence_order,
                barrier_count: *count,
                max_severity: worst.as_str().to_string(),
            })
        })
        .collect();

    AnalysisDetailResponse {
        analysis,
        barriers_by_severity: by_severity,
        barriers_by_type: by_type,
        images_with_barriers,
    }
}
