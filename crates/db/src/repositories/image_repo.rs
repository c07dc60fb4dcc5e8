//! Repository for the `scan_images` table.

use sqlx::PgPool;
use wheelway_core::types::DbId;

use crate::models::image::{CreateScanImage, ScanImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scan_id, file_path, original_filename, content_type, \
    file_size_bytes, width, height, sequence_order, created_at, updated_at";

/// Provides CRUD and ordering operations for scan images.
pub struct ScanImageRepo;

impl ScanImageRepo {
    /// Insert a new scan image, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateScanImage) -> Result<ScanImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO scan_images
                (scan_id, file_path, original_filename, content_type,
                 file_size_bytes, width, height, sequence_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScanImage>(&query)
            .bind(input.scan_id)
            .bind(&input.file_path)
            .bind(&input.original_filename)
            .bind(&input.content_type)
            .bind(input.file_size_bytes)
            .bind(input.width)
            .bind(input.height)
            .bind(input.sequence_order)
            .fetch_one(pool)
            .await
    }

    /// Find a scan image scoped to its parent scan.
    ///
    /// Returns `None` when the image does not exist or belongs to a
    /// different scan, so route handlers cannot leak cross-scan rows.
    pub async fn find_for_scan(
        pool: &PgPool,
        scan_id: DbId,
        image_id: DbId,
    ) -> Result<Option<ScanImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scan_images WHERE id = $1 AND scan_id = $2");
        sqlx::query_as::<_, ScanImage>(&query)
            .bind(image_id)
            .bind(scan_id)
            .fetch_optional(pool)
            .await
    }

    /// List a scan's images in route order.
    pub async fn list_by_scan(pool: &PgPool, scan_id: DbId) -> Result<Vec<ScanImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scan_images
             WHERE scan_id = $1
             ORDER BY sequence_order ASC, id ASC"
        );
        sqlx::query_as::<_, ScanImage>(&query)
            .bind(scan_id)
            .fetch_all(pool)
            .await
    }

    /// Count images for a scan.
    pub async fn count_by_scan(pool: &PgPool, scan_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scan_images WHERE scan_id = $1")
            .bind(scan_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Image counts for a set of scans, as `(scan_id, count)` pairs.
    ///
    /// Scans with no images are absent from the result.
    pub async fn counts_for_scans(
        pool: &PgPool,
        scan_ids: &[DbId],
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT scan_id, COUNT(*) FROM scan_images \
             WHERE scan_id = ANY($1) GROUP BY scan_id",
        )
        .bind(scan_ids)
        .fetch_all(pool)
        .await
    }

    /// Next free sequence position for a scan (max existing + 1, or 0 if
    /// the scan has no images yet).
    pub async fn next_sequence_order(pool: &PgPool, scan_id: DbId) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sequence_order) + 1, 0) \
             FROM scan_images WHERE scan_id = $1",
        )
        .bind(scan_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Re-sequence a scan's images to match `ordered_ids` (first id gets
    /// order 0, and so on). Runs in a transaction; either every image moves
    /// or none do.
    ///
    /// Returns `false` without writing if `ordered_ids` is not exactly the
    /// set of image IDs belonging to the scan.
    pub async fn reorder(
        pool: &PgPool,
        scan_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Vec<(DbId,)> =
            sqlx::query_as("SELECT id FROM scan_images WHERE scan_id = $1 ORDER BY id")
                .bind(scan_id)
                .fetch_all(&mut *tx)
                .await?;

        let mut expected: Vec<DbId> = existing.into_iter().map(|r| r.0).collect();
        let mut requested: Vec<DbId> = ordered_ids.to_vec();
        expected.sort_unstable();
        requested.sort_unstable();
        if expected != requested {
            return Ok(false);
        }

        for (position, image_id) in ordered_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE scan_images SET sequence_order = $1 \
                 WHERE id = $2 AND scan_id = $3",
            )
            .bind(position as i32)
            .bind(image_id)
            .bind(scan_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a scan image by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scan_images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
