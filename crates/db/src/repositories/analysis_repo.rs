//! Repository for the `analyses` table.
//!
//! The table holds one row per scan, keyed by `uq_analyses_scan_id`, so every
//! operation here addresses rows by scan rather than by row id.

use sqlx::PgPool;
use wheelway_core::types::DbId;

use crate::models::analysis::Analysis;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scan_id, status, started_at, completed_at, \
    error_message, total_images_analyzed, total_barriers_found, \
    accessibility_score, world_model_json, created_at, updated_at";

/// Provides lifecycle operations for analysis results.
pub struct AnalysisRepo;

impl AnalysisRepo {
    /// The analysis result for a scan, if one has ever been started.
    pub async fn find_for_scan(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Option<Analysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analyses WHERE scan_id = $1");
        sqlx::query_as::<_, Analysis>(&query)
            .bind(scan_id)
            .fetch_optional(pool)
            .await
    }

    /// Begin a run: insert the scan's analysis row in `in_progress`, or reset
    /// the existing one in place.
    ///
    /// The reset clears every result field, so a re-run can never leak state
    /// from the previous run. The row id survives resets.
    pub async fn start(pool: &PgPool, scan_id: DbId) -> Result<Analysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO analyses (scan_id, status, started_at)
             VALUES ($1, 'in_progress', NOW())
             ON CONFLICT (scan_id) DO UPDATE SET
                status = 'in_progress',
                started_at = NOW(),
                completed_at = NULL,
                error_message = NULL,
                total_images_analyzed = 0,
                total_barriers_found = 0,
                accessibility_score = NULL,
                world_model_json = NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Analysis>(&query)
            .bind(scan_id)
            .fetch_one(pool)
            .await
    }

    /// Finish a run successfully, recording the totals, the scan-level score
    /// (if any image produced one) and the serialized world model.
    pub async fn mark_completed(
        pool: &PgPool,
        scan_id: DbId,
        total_images_analyzed: i32,
        total_barriers_found: i32,
        accessibility_score: Option<f64>,
        world_model_json: &str,
    ) -> Result<Option<Analysis>, sqlx::Error> {
        let query = format!(
            "UPDATE analyses SET
                status = 'completed',
                completed_at = NOW(),
                total_images_analyzed = $2,
                total_barriers_found = $3,
                accessibility_score = $4,
                world_model_json = $5
             WHERE scan_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Analysis>(&query)
            .bind(scan_id)
            .bind(total_images_analyzed)
            .bind(total_barriers_found)
            .bind(accessibility_score)
            .bind(world_model_json)
            .fetch_optional(pool)
            .await
    }

    /// Finish a run in failure, recording the error and stamping
    /// `completed_at`.
    pub async fn mark_failed(
        pool: &PgPool,
        scan_id: DbId,
        error_message: &str,
    ) -> Result<Option<Analysis>, sqlx::Error> {
        let query = format!(
            "UPDATE analyses SET
                status = 'failed',
                error_message = $2,
                completed_at = NOW()
             WHERE scan_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Analysis>(&query)
            .bind(scan_id)
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }
}
