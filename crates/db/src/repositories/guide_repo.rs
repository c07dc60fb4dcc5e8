//! Repository for the `guides` table.
//!
//! At most one guide exists per scan (`uq_guides_scan_id`); regenerating
//! replaces the stored one in place.

use sqlx::PgPool;
use wheelway_core::types::DbId;

use crate::models::guide::{CreateGuide, Guide};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scan_id, wheelchair_profile_id, title, summary, \
    steps_json, critical_alerts_json, created_at, updated_at";

/// Provides replace and fetch operations for navigation guides.
pub struct GuideRepo;

impl GuideRepo {
    /// Store a freshly generated guide, overwriting the scan's previous one
    /// if it had any.
    pub async fn replace_for_scan(
        pool: &PgPool,
        input: &CreateGuide,
    ) -> Result<Guide, sqlx::Error> {
        let query = format!(
            "INSERT INTO guides
                (scan_id, wheelchair_profile_id, title, summary,
                 steps_json, critical_alerts_json)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (scan_id) DO UPDATE SET
                wheelchair_profile_id = EXCLUDED.wheelchair_profile_id,
                title = EXCLUDED.title,
                summary = EXCLUDED.summary,
                steps_json = EXCLUDED.steps_json,
                critical_alerts_json = EXCLUDED.critical_alerts_json
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Guide>(&query)
            .bind(input.scan_id)
            .bind(input.wheelchair_profile_id)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(&input.steps_json)
            .bind(&input.critical_alerts_json)
            .fetch_one(pool)
            .await
    }

    /// The stored guide for a scan, if one has been generated.
    pub async fn find_by_scan(pool: &PgPool, scan_id: DbId) -> Result<Option<Guide>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guides WHERE scan_id = $1");
        sqlx::query_as::<_, Guide>(&query)
            .bind(scan_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a scan has a stored guide, without fetching it.
    pub async fn exists_for_scan(pool: &PgPool, scan_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM guides WHERE scan_id = $1)")
            .bind(scan_id)
            .fetch_one(pool)
            .await
    }
}
