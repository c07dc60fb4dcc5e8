//! Repository for the `wheelchair_profiles` table.

use sqlx::PgPool;
use wheelway_core::profile::builtin_profiles;
use wheelway_core::types::DbId;

use crate::models::profile::{CreateWheelchairProfile, WheelchairProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, width_cm, length_cm, min_door_width_cm, \
    max_step_height_cm, max_slope_percent, can_handle_gravel, can_handle_grass, \
    wheelchair_type, is_default, created_at, updated_at";

/// Provides CRUD and seeding operations for wheelchair profiles.
pub struct WheelchairProfileRepo;

impl WheelchairProfileRepo {
    /// Insert a new wheelchair profile, returning the created row.
    ///
    /// Omitted capability fields fall back to the schema defaults.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWheelchairProfile,
    ) -> Result<WheelchairProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO wheelchair_profiles
                (name, description, width_cm, length_cm, min_door_width_cm,
                 max_step_height_cm, max_slope_percent, can_handle_gravel,
                 can_handle_grass, wheelchair_type, is_default)
             VALUES ($1, $2, $3, $4, $5,
                     COALESCE($6, 2.0), COALESCE($7, 8.0), COALESCE($8, false),
                     COALESCE($9, false), COALESCE($10, 'manual'), COALESCE($11, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WheelchairProfile>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.width_cm)
            .bind(input.length_cm)
            .bind(input.min_door_width_cm)
            .bind(input.max_step_height_cm)
            .bind(input.max_slope_percent)
            .bind(input.can_handle_gravel)
            .bind(input.can_handle_grass)
            .bind(&input.wheelchair_type)
            .bind(input.is_default)
            .fetch_one(pool)
            .await
    }

    /// Find a wheelchair profile by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WheelchairProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wheelchair_profiles WHERE id = $1");
        sqlx::query_as::<_, WheelchairProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The default profile, if one is marked.
    pub async fn find_default(pool: &PgPool) -> Result<Option<WheelchairProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wheelchair_profiles
             WHERE is_default = true
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, WheelchairProfile>(&query)
            .fetch_optional(pool)
            .await
    }

    /// List all wheelchair profiles, default first, then by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<WheelchairProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wheelchair_profiles
             ORDER BY is_default DESC, name ASC, id ASC"
        );
        sqlx::query_as::<_, WheelchairProfile>(&query)
            .fetch_all(pool)
            .await
    }

    /// Delete a wheelchair profile by ID. Returns `true` if a row was
    /// removed. Guides that referenced it keep their row with the profile
    /// link nulled (FK is `ON DELETE SET NULL`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wheelchair_profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert the built-in profiles if the table is empty.
    ///
    /// Runs in one transaction so concurrent callers cannot produce a
    /// partial seed; the unique name constraint backstops a race between
    /// two empty-table checks. Returns the number of profiles inserted
    /// (zero when the table was already populated).
    pub async fn seed_builtins(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wheelchair_profiles")
            .fetch_one(&mut *tx)
            .await?;
        if existing.0 > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for spec in builtin_profiles() {
            sqlx::query(
                "INSERT INTO wheelchair_profiles
                    (name, description, width_cm, length_cm, min_door_width_cm,
                     max_step_height_cm, max_slope_percent, can_handle_gravel,
                     can_handle_grass, wheelchair_type, is_default)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(&spec.name)
            .bind(&spec.description)
            .bind(spec.width_cm)
            .bind(spec.length_cm)
            .bind(spec.min_door_width_cm)
            .bind(spec.max_step_height_cm)
            .bind(spec.max_slope_percent)
            .bind(spec.can_handle_gravel)
            .bind(spec.can_handle_grass)
            .bind(spec.wheelchair_type.as_str())
            .bind(spec.is_default)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
