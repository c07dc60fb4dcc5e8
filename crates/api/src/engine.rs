//! Analysis orchestration.
//!
//! Drives the vision analyzer over a scan's images in sequence order,
//! persists detected barriers per image, and stores the resulting world
//! model on the scan's analysis row. The run executes synchronously inside
//! the triggering request; a per-scan cancellation token lets a second
//! request stop it between images, keeping whatever was analyzed so far.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use wheelway_core::annotation::ImageAnnotation;
use wheelway_core::barrier::{BarrierSummary, DetectedBarrier};
use wheelway_core::scan::ScanStatus;
use wheelway_core::types::DbId;
use wheelway_core::world_model::{build_world_model, WorldModelImage};
use wheelway_core::CoreError;
use wheelway_db::models::analysis::Analysis;
use wheelway_db::models::barrier::CreateBarrier;
use wheelway_db::models::image::ScanImage;
use wheelway_db::repositories::{AnalysisRepo, BarrierRepo, ScanRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Active-run registry
// ---------------------------------------------------------------------------

/// Cancellation tokens for analyses currently running, keyed by scan id.
///
/// Doubles as the duplicate-run guard: a scan id present here means a
/// request is mid-run, and later analyze requests for the same scan are
/// rejected before touching the analyzer.
#[derive(Debug, Default)]
pub struct ActiveAnalyses {
    running: Mutex<HashMap<DbId, CancellationToken>>,
}

impl ActiveAnalyses {
    /// Register a run for `scan_id`.
    ///
    /// Returns `None` when a run is already registered for the scan.
    pub async fn begin(&self, scan_id: DbId) -> Option<CancellationToken> {
        let mut running = self.running.lock().await;
        if running.contains_key(&scan_id) {
            return None;
        }
        let token = CancellationToken::new();
        running.insert(scan_id, token.clone());
        Some(token)
    }

    /// Cancel the run for `scan_id`, if one is registered.
    pub async fn cancel(&self, scan_id: DbId) -> bool {
        let running = self.running.lock().await;
        match running.get(&scan_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop the registration for `scan_id` once its run has ended.
    pub async fn finish(&self, scan_id: DbId) {
        self.running.lock().await.remove(&scan_id);
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Outcome of analyzing a single image.
struct AnalyzedImage {
    image_id: DbId,
    sequence_order: i32,
    annotation: ImageAnnotation,
    barriers: Vec<BarrierSummary>,
}

/// Run a full analysis for `scan_id` over `images` (already in sequence
/// order). The caller must hold the [`ActiveAnalyses`] registration that
/// produced `token`.
///
/// On any orchestration error the analysis row is marked failed and the
/// scan moves to `failed` before the error propagates.
pub async fn run_analysis(
    state: &AppState,
    scan_id: DbId,
    images: &[ScanImage],
    force: bool,
    token: &CancellationToken,
) -> AppResult<Analysis> {
    match run_inner(state, scan_id, images, force, token).await {
        Ok(analysis) => Ok(analysis),
        Err(err) => {
            tracing::error!(scan_id, error = %err, "Analysis run failed");
            record_failure(state, scan_id, &err.to_string()).await;
            Err(err)
        }
    }
}

async fn run_inner(
    state: &AppState,
    scan_id: DbId,
    images: &[ScanImage],
    force: bool,
    token: &CancellationToken,
) -> AppResult<Analysis> {
    AnalysisRepo::start(&state.pool, scan_id).await?;
    ScanRepo::set_status(&state.pool, scan_id, ScanStatus::Analyzing).await?;

    if force {
        let wiped = BarrierRepo::delete_by_scan(&state.pool, scan_id).await?;
        if wiped > 0 {
            tracing::info!(scan_id, barriers = wiped, "Cleared stored barriers for re-analysis");
        }
    }

    let mut analyzed: Vec<AnalyzedImage> = Vec::with_capacity(images.len());
    for image in images {
        if token.is_cancelled() {
            tracing::info!(
                scan_id,
                analyzed = analyzed.len(),
                total = images.len(),
                "Analysis cancelled, keeping results so far"
            );
            break;
        }

        let annotation = analyze_one(state, image).await;
        let barriers =
            persist_barriers(&state.pool, scan_id, image.id, &annotation.barriers).await?;
        analyzed.push(AnalyzedImage {
            image_id: image.id,
            sequence_order: image.sequence_order,
            annotation,
            barriers,
        });
    }

    let world_model = build_world_model(
        analyzed
            .iter()
            .map(|item| WorldModelImage {
                image_id: item.image_id,
                sequence_order: item.sequence_order,
                barriers: item.barriers.clone(),
                annotation: item.annotation.clone(),
            })
            .collect(),
    )
    .map_err(|err| {
        AppError::Core(CoreError::Internal(format!("world model build failed: {err}")))
    })?;
    let world_model_json = world_model.to_json().map_err(|err| {
        AppError::Core(CoreError::Internal(format!(
            "world model serialization failed: {err}"
        )))
    })?;

    let total_barriers: usize = analyzed.iter().map(|item| item.barriers.len()).sum();
    let score = mean_score(&analyzed);

    let analysis = AnalysisRepo::mark_completed(
        &state.pool,
        scan_id,
        analyzed.len() as i32,
        total_barriers as i32,
        score,
        &world_model_json,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Analysis for scan",
        id: scan_id,
    }))?;
    ScanRepo::set_status(&state.pool, scan_id, ScanStatus::Completed).await?;

    tracing::info!(
        scan_id,
        images = analyzed.len(),
        barriers = total_barriers,
        score = ?score,
        "Analysis completed"
    );
    Ok(analysis)
}

/// Analyze one image, degrading to a failed annotation on any per-image
/// error so the run can continue with the remaining images.
async fn analyze_one(state: &AppState, image: &ScanImage) -> ImageAnnotation {
    let bytes = match tokio::fs::read(&image.file_path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(image_id = image.id, error = %err, "Could not read stored image file");
            return ImageAnnotation::failed(format!("Could not read stored image file: {err}"));
        }
    };

    let content_type = image.content_type.as_deref().unwrap_or("image/jpeg");
    match state.vision.analyze_image(&bytes, content_type).await {
        Ok(annotation) => annotation,
        Err(err) => {
            tracing::warn!(image_id = image.id, error = %err, "Image analysis failed");
            ImageAnnotation::failed(err.to_string())
        }
    }
}

/// Insert the detected barriers for one image, returning their stored
/// summaries (with row ids) for the world model.
async fn persist_barriers(
    pool: &wheelway_db::DbPool,
    scan_id: DbId,
    image_id: DbId,
    detected: &[DetectedBarrier],
) -> AppResult<Vec<BarrierSummary>> {
    if detected.is_empty() {
        return Ok(Vec::new());
    }

    let inputs: Vec<CreateBarrier> = detected
        .iter()
        .map(|barrier| CreateBarrier {
            scan_id,
            image_id,
            barrier_type: barrier.barrier_type.as_str().to_string(),
            severity: barrier.severity.as_str().to_string(),
            description: barrier.description.clone(),
            bounding_box_json: barrier.bbox.as_ref().map(|bbox| serde_json::json!(bbox)),
            estimated_width_cm: barrier.estimated_width_cm,
            estimated_height_cm: barrier.estimated_height_cm,
            estimated_depth_cm: barrier.estimated_depth_cm,
            recommendation: barrier.recommendation.clone(),
            confidence: Some(barrier.confidence),
        })
        .collect();

    let rows = BarrierRepo::create_for_image(pool, &inputs).await?;
    Ok(rows.iter().map(|row| row.to_summary()).collect())
}

/// Mean accessibility score over the images the analyzer actually scored.
///
/// `None` when every image failed, or none were analyzed at all.
fn mean_score(analyzed: &[AnalyzedImage]) -> Option<f64> {
    let scores: Vec<f64> = analyzed
        .iter()
        .filter(|item| !item.annotation.is_failed())
        .map(|item| item.annotation.accessibility_score)
        .collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Best-effort failure bookkeeping. Logs instead of masking the original
/// error when the status writes themselves fail.
async fn record_failure(state: &AppState, scan_id: DbId, message: &str) {
    if let Err(err) = AnalysisRepo::mark_failed(&state.pool, scan_id, message).await {
        tracing::error!(scan_id, error = %err, "Could not mark analysis as failed");
    }
    if let Err(err) = ScanRepo::set_status(&state.pool, scan_id, ScanStatus::Failed).await {
        tracing::error!(scan_id, error = %err, "Could not mark scan as failed");
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn scored(score: f64) -> AnalyzedImage {
        AnalyzedImage {
            image_id: 1,
            sequence_order: 0,
            annotation: ImageAnnotation {
                accessibility_score: score,
                ..ImageAnnotation::default()
            },
            barriers: Vec::new(),
        }
    }

    fn failed() -> AnalyzedImage {
        AnalyzedImage {
            image_id: 2,
            sequence_order: 1,
            annotation: ImageAnnotation::failed("boom"),
            barriers: Vec::new(),
        }
    }

    #[test]
    fn mean_score_averages_successful_images_only() {
        let items = vec![scored(80.0), scored(40.0), failed()];
        assert_eq!(mean_score(&items), Some(60.0));
    }

    #[test]
    fn mean_score_is_none_when_all_failed() {
        assert_eq!(mean_score(&[failed()]), None);
        assert_eq!(mean_score(&[]), None);
    }

    #[tokio::test]
    async fn begin_rejects_duplicate_runs() {
        let registry = ActiveAnalyses::default();
        assert_matches!(registry.begin(7).await, Some(_));
        assert_matches!(registry.begin(7).await, None);

        registry.finish(7).await;
        assert_matches!(registry.begin(7).await, Some(_));
    }

    #[tokio::test]
    async fn cancel_trips_the_registered_token() {
        let registry = ActiveAnalyses::default();
        let token = registry.begin(3).await.unwrap();

        assert!(!token.is_cancelled());
        assert!(registry.cancel(3).await);
        assert!(token.is_cancelled());

        registry.finish(3).await;
        assert!(!registry.cancel(3).await);
    }
}
