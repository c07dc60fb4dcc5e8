//! Handlers for wheelchair profiles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use wheelway_core::profile::{
    validate_profile, WheelchairProfileSpec, WheelchairType, DEFAULT_MAX_SLOPE_PERCENT,
    DEFAULT_MAX_STEP_HEIGHT_CM,
};
use wheelway_core::types::DbId;
use wheelway_core::CoreError;
use wheelway_db::models::profile::{CreateWheelchairProfile, WheelchairProfile};
use wheelway_db::repositories::WheelchairProfileRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/wheelchair-profiles
///
/// An empty store is seeded with the built-in profile set first, so the
/// endpoint never returns an empty list.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<WheelchairProfile>>> {
    let profiles = WheelchairProfileRepo::list(&state.pool).await?;
    if !profiles.is_empty() {
        return Ok(Json(profiles));
    }

    let seeded = WheelchairProfileRepo::seed_builtins(&state.pool).await?;
    tracing::info!(count = seeded, "Seeded built-in wheelchair profiles");
    Ok(Json(WheelchairProfileRepo::list(&state.pool).await?))
}

/// POST /api/v1/wheelchair-profiles
///
/// Created profiles are never the default; the seeded `Standard Manual`
/// profile keeps that role.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWheelchairProfile>,
) -> AppResult<(StatusCode, Json<WheelchairProfile>)> {
    let wheelchair_type = match &input.wheelchair_type {
        Some(raw) => WheelchairType::from_str(raw)?,
        None => WheelchairType::Manual,
    };
    let spec = WheelchairProfileSpec {
        name: input.name.clone(),
        description: input.description.clone(),
        width_cm: input.width_cm,
        length_cm: input.length_cm,
        min_door_width_cm: input.min_door_width_cm,
        max_step_height_cm: input
            .max_step_height_cm
            .unwrap_or(DEFAULT_MAX_STEP_HEIGHT_CM),
        max_slope_percent: input.max_slope_percent.unwrap_or(DEFAULT_MAX_SLOPE_PERCENT),
        can_handle_gravel: input.can_handle_gravel.unwrap_or(false),
        can_handle_grass: input.can_handle_grass.unwrap_or(false),
        wheelchair_type,
        is_default: false,
    };
    validate_profile(&spec)?;

    let input = CreateWheelchairProfile {
        is_default: Some(false),
        ..input
    };
    let profile = WheelchairProfileRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/wheelchair-profiles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<WheelchairProfile>> {
    let profile = WheelchairProfileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WheelchairProfile",
            id,
        }))?;
    Ok(Json(profile))
}

/// DELETE /api/v1/wheelchair-profiles/{id}
///
/// The default profile cannot be deleted.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let profile = WheelchairProfileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WheelchairProfile",
            id,
        }))?;
    if profile.is_default {
        return Err(AppError::BadRequest(
            "Cannot delete default profile".to_string(),
        ));
    }

    WheelchairProfileRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
