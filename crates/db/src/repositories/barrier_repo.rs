//! Repository for the `barriers` table.
//!
//! Barrier rows are analyzer output: inserted when an image is analyzed and
//! wiped wholesale when a scan is re-analyzed. There is no update path.

use sqlx::PgPool;
use wheelway_core::barrier::{BarrierSeverity, BarrierType};
use wheelway_core::types::DbId;

use crate::models::barrier::{Barrier, CreateBarrier};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scan_id, image_id, barrier_type, severity, description, \
    bounding_box_json, estimated_width_cm, estimated_height_cm, estimated_depth_cm, \
    recommendation, confidence, created_at, updated_at";

/// Provides insert, list, and wipe operations for barriers.
pub struct BarrierRepo;

impl BarrierRepo {
    /// Insert a new barrier, returning the created row.
    ///
    /// If `confidence` is `None`, the schema default (0.5) applies.
    pub async fn create(pool: &PgPool, input: &CreateBarrier) -> Result<Barrier, sqlx::Error> {
        let query = format!(
            "INSERT INTO barriers
                (scan_id, image_id, barrier_type, severity, description,
                 bounding_box_json, estimated_width_cm, estimated_height_cm,
                 estimated_depth_cm, recommendation, confidence)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 0.5))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Barrier>(&query)
            .bind(input.scan_id)
            .bind(input.image_id)
            .bind(&input.barrier_type)
            .bind(&input.severity)
            .bind(&input.description)
            .bind(&input.bounding_box_json)
            .bind(input.estimated_width_cm)
            .bind(input.estimated_height_cm)
            .bind(input.estimated_depth_cm)
            .bind(&input.recommendation)
            .bind(input.confidence)
            .fetch_one(pool)
            .await
    }

    /// Insert every barrier detected in one image, in one transaction.
    ///
    /// Returns the created rows in insert order.
    pub async fn create_for_image(
        pool: &PgPool,
        inputs: &[CreateBarrier],
    ) -> Result<Vec<Barrier>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO barriers
                (scan_id, image_id, barrier_type, severity, description,
                 bounding_box_json, estimated_width_cm, estimated_height_cm,
                 estimated_depth_cm, recommendation, confidence)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 0.5))
             RETURNING {COLUMNS}"
        );

        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let barrier = sqlx::query_as::<_, Barrier>(&query)
                .bind(input.scan_id)
                .bind(input.image_id)
                .bind(&input.barrier_type)
                .bind(&input.severity)
                .bind(&input.description)
                .bind(&input.bounding_box_json)
                .bind(input.estimated_width_cm)
                .bind(input.estimated_height_cm)
                .bind(input.estimated_depth_cm)
                .bind(&input.recommendation)
                .bind(input.confidence)
                .fetch_one(&mut *tx)
                .await?;
            created.push(barrier);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// List barriers for a scan, optionally filtered by severity and type,
    /// in insertion order.
    pub async fn list_by_scan(
        pool: &PgPool,
        scan_id: DbId,
        severity: Option<BarrierSeverity>,
        barrier_type: Option<BarrierType>,
    ) -> Result<Vec<Barrier>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM barriers
             WHERE scan_id = $1
               AND ($2::TEXT IS NULL OR severity = $2)
               AND ($3::TEXT IS NULL OR barrier_type = $3)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Barrier>(&query)
            .bind(scan_id)
            .bind(severity.map(|s| s.as_str()))
            .bind(barrier_type.map(|t| t.as_str()))
            .fetch_all(pool)
            .await
    }

    /// List all barriers detected in one image, in insertion order.
    pub async fn list_by_image(pool: &PgPool, image_id: DbId) -> Result<Vec<Barrier>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM barriers
             WHERE image_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Barrier>(&query)
            .bind(image_id)
            .fetch_all(pool)
            .await
    }

    /// Barrier counts per image for a scan. Images without barriers are
    /// absent from the result.
    pub async fn counts_by_image(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT image_id, COUNT(*) FROM barriers \
             WHERE scan_id = $1 GROUP BY image_id",
        )
        .bind(scan_id)
        .fetch_all(pool)
        .await
    }

    /// Delete all barriers for a scan (before re-analysis).
    ///
    /// Returns the number of deleted rows.
    pub async fn delete_by_scan(pool: &PgPool, scan_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM barriers WHERE scan_id = $1")
            .bind(scan_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
