//! Handlers for the world model and the navigation guide.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use wheelway_core::annotation::ImageAnnotation;
use wheelway_core::guide::{generate_guide, GuideBarrier, GuideImage, NavigationStep};
use wheelway_core::scan::AnalysisStatus;
use wheelway_core::types::DbId;
use wheelway_core::world_model::{find_recommended_path, EdgeAttrs, NodeAttrs, WorldGraph};
use wheelway_core::CoreError;
use wheelway_db::models::analysis::Analysis;
use wheelway_db::models::guide::{CreateGuide, Guide};
use wheelway_db::models::profile::WheelchairProfile;
use wheelway_db::repositories::{
    AnalysisRepo, BarrierRepo, GuideRepo, ScanImageRepo, WheelchairProfileRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::require_scan;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response types
// ---------------------------------------------------------------------------

/// Body for `POST /scans/{scan_id}/guide`. The whole body is optional.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateGuideRequest {
    /// Profile to tailor door-width warnings to. Falls back to the default
    /// profile when omitted.
    pub wheelchair_profile_id: Option<DbId>,
}

/// One graph node with its id inlined beside the stored attributes.
#[derive(Debug, Serialize)]
struct NodeView<'a> {
    id: &'a str,
    #[serde(flatten)]
    attrs: &'a NodeAttrs,
}

/// One directed edge with its endpoints inlined.
#[derive(Debug, Serialize)]
struct EdgeView<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(flatten)]
    attrs: &'a EdgeAttrs,
}

/// Stored guide plus its live context: the analysis score and the profile
/// row it was tailored to.
#[derive(Debug, Serialize)]
pub struct GuideResponse {
    pub id: DbId,
    pub scan_id: DbId,
    pub title: String,
    pub summary: String,
    pub accessibility_score: Option<f64>,
    pub navigation_steps: Vec<NavigationStep>,
    pub critical_alerts: Vec<String>,
    pub wheelchair_profile: Option<WheelchairProfile>,
}

// ---------------------------------------------------------------------------
// World model
// ---------------------------------------------------------------------------

/// GET /api/v1/scans/{scan_id}/world-model
///
/// The stored traversal graph in node-link form, plus the recommended
/// least-difficulty path across it.
pub async fn get_world_model(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    require_scan(&state.pool, scan_id).await?;

    let analysis = AnalysisRepo::find_for_scan(&state.pool, scan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "World model for scan",
            id: scan_id,
        }))?;
    let graph = decode_world_model(&analysis, scan_id)?;

    let nodes: Vec<NodeView> = graph
        .nodes()
        .map(|(id, attrs)| NodeView {
            id: id.as_str(),
            attrs,
        })
        .collect();
    let edges: Vec<EdgeView> = graph
        .edges()
        .map(|(source, target, attrs)| EdgeView {
            source: source.as_str(),
            target: target.as_str(),
            attrs,
        })
        .collect();
    let recommended_path = find_recommended_path(&graph, None, None).unwrap_or_default();

    Ok(Json(json!({
        "scan_id": scan_id,
        "nodes": nodes,
        "edges": edges,
        "recommended_path": recommended_path,
        "total_nodes": graph.node_count(),
        "total_edges": graph.edge_count(),
    })))
}

// ---------------------------------------------------------------------------
// Guide
// ---------------------------------------------------------------------------

/// GET /api/v1/scans/{scan_id}/guide
pub async fn get_guide(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<Json<GuideResponse>> {
    require_scan(&state.pool, scan_id).await?;

    let guide = GuideRepo::find_by_scan(&state.pool, scan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Guide for scan",
            id: scan_id,
        }))?;

    Ok(Json(guide_response(&state, guide).await?))
}

/// POST /api/v1/scans/{scan_id}/guide
///
/// Regenerates the guide from the stored world model and barriers,
/// replacing any previous guide for the scan. Requires a completed
/// analysis.
pub async fn generate(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
    body: Option<Json<GenerateGuideRequest>>,
) -> AppResult<(StatusCode, Json<GuideResponse>)> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    require_scan(&state.pool, scan_id).await?;

    let analysis = AnalysisRepo::find_for_scan(&state.pool, scan_id)
        .await?
        .filter(|analysis| analysis.status == AnalysisStatus::Completed.as_str())
        .ok_or_else(|| AppError::BadRequest("Analysis not completed".to_string()))?;

    let profile = match request.wheelchair_profile_id {
        Some(profile_id) => Some(
            WheelchairProfileRepo::find_by_id(&state.pool, profile_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "WheelchairProfile",
                    id: profile_id,
                }))?,
        ),
        None => WheelchairProfileRepo::find_default(&state.pool).await?,
    };

    let graph = decode_world_model(&analysis, scan_id)?;

    // Per-image annotations are rebuilt from the graph nodes; the node
    // carries everything the step text needs except the barrier details,
    // which come from the barriers table below.
    let mut annotations: HashMap<DbId, ImageAnnotation> = HashMap::new();
    for (_, attrs) in graph.nodes() {
        annotations.insert(
            attrs.image_id,
            ImageAnnotation {
                space_type: attrs.space_type,
                features: attrs.features.clone(),
                accessibility_score: attrs.accessibility_score,
                ..ImageAnnotation::default()
            },
        );
    }

    let barriers = BarrierRepo::list_by_scan(&state.pool, scan_id, None, None).await?;
    let mut grouped: HashMap<DbId, Vec<GuideBarrier>> = HashMap::new();
    for barrier in &barriers {
        grouped
            .entry(barrier.image_id)
            .or_default()
            .push(barrier.to_guide_barrier());
    }

    let images: Vec<GuideImage> = ScanImageRepo::list_by_scan(&state.pool, scan_id)
        .await?
        .into_iter()
        .map(|image| GuideImage {
            image_id: image.id,
            sequence_order: image.sequence_order,
            barriers: grouped.remove(&image.id).unwrap_or_default(),
        })
        .collect();

    let spec = profile.as_ref().map(|row| row.to_spec());
    let content = generate_guide(scan_id, &images, &annotations, spec.as_ref());
    let step_count = content.steps.len();

    let input = CreateGuide {
        scan_id,
        wheelchair_profile_id: profile.as_ref().map(|row| row.id),
        title: content.title,
        summary: content.summary,
        steps_json: serde_json::to_value(&content.steps)
            .map_err(|err| AppError::InternalError(err.to_string()))?,
        critical_alerts_json: serde_json::to_value(&content.critical_alerts)
            .map_err(|err| AppError::InternalError(err.to_string()))?,
    };
    let guide = GuideRepo::replace_for_scan(&state.pool, &input).await?;

    tracing::info!(scan_id, steps = step_count, "Navigation guide generated");
    Ok((
        StatusCode::CREATED,
        Json(guide_response(&state, guide).await?),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode the stored world-model text, mapping absence to 404 and corrupt
/// text to an invalid-state conflict telling the caller to re-analyze.
fn decode_world_model(analysis: &Analysis, scan_id: DbId) -> Result<WorldGraph, AppError> {
    match analysis.world_model() {
        Ok(Some(graph)) => Ok(graph),
        Ok(None) => Err(AppError::Core(CoreError::NotFound {
            entity: "World model for scan",
            id: scan_id,
        })),
        Err(err) => {
            tracing::error!(scan_id, error = %err, "Stored world model failed to decode");
            Err(AppError::Core(CoreError::Conflict(
                "Stored world model cannot be decoded; re-run the analysis".to_string(),
            )))
        }
    }
}

/// Assemble the guide response from the stored row.
///
/// The accessibility score is read live from the analysis row rather than
/// denormalized onto the guide, so a re-analysis is reflected immediately.
async fn guide_response(state: &AppState, guide: Guide) -> AppResult<GuideResponse> {
    let accessibility_score = AnalysisRepo::find_for_scan(&state.pool, guide.scan_id)
        .await?
        .and_then(|analysis| analysis.accessibility_score);

    let wheelchair_profile = match guide.wheelchair_profile_id {
        Some(profile_id) => WheelchairProfileRepo::find_by_id(&state.pool, profile_id).await?,
        None => None,
    };

    let navigation_steps = guide
        .steps()
        .map_err(|err| AppError::InternalError(format!("stored guide steps failed to decode: {err}")))?;
    let critical_alerts = guide.critical_alerts().map_err(|err| {
        AppError::InternalError(format!("stored guide alerts failed to decode: {err}"))
    })?;

    Ok(GuideResponse {
        id: guide.id,
        scan_id: guide.scan_id,
        title: guide.title,
        summary: guide.summary,
        accessibility_score,
        navigation_steps,
        critical_alerts,
        wheelchair_profile,
    })
}
