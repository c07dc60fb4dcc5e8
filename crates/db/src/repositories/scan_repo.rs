//! Repository for the `scans` table.

use sqlx::PgPool;
use wheelway_core::scan::ScanStatus;
use wheelway_core::types::DbId;

use crate::models::scan::{CreateScan, Scan, UpdateScan};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, location, status, created_at, updated_at";

/// Provides CRUD operations for scans.
pub struct ScanRepo;

impl ScanRepo {
    /// Insert a new scan in `pending` status, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateScan) -> Result<Scan, sqlx::Error> {
        let query = format!(
            "INSERT INTO scans (name, description, location)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    /// Find a scan by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scans WHERE id = $1");
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List scans, newest first, optionally restricted to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<ScanStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Scan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scans
             WHERE $1::TEXT IS NULL OR status = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count scans, optionally restricted to one status.
    pub async fn count(pool: &PgPool, status: Option<ScanStatus>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM scans WHERE $1::TEXT IS NULL OR status = $1",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Update a scan's metadata. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScan,
    ) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!(
            "UPDATE scans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .fetch_optional(pool)
            .await
    }

    /// Move a scan to the given lifecycle status.
    ///
    /// Returns `None` if no row with the given `id` exists. Transition
    /// legality is the caller's responsibility.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: ScanStatus,
    ) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!(
            "UPDATE scans SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a scan by ID, cascading to its images, barriers, analysis
    /// result, and guide. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scans WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
