//! Wheelchair profile entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wheelway_core::profile::{WheelchairProfileSpec, WheelchairType};
use wheelway_core::types::{DbId, Timestamp};

/// A row from the `wheelchair_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WheelchairProfile {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub width_cm: f64,
    pub length_cm: f64,
    pub min_door_width_cm: f64,
    pub max_step_height_cm: f64,
    pub max_slope_percent: f64,
    pub can_handle_gravel: bool,
    pub can_handle_grass: bool,
    pub wheelchair_type: String,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WheelchairProfile {
    /// Typed view of the wheelchair type column.
    pub fn kind(&self) -> WheelchairType {
        WheelchairType::parse_lossy(&self.wheelchair_type)
    }

    /// Project this row into the pure spec shape the guide generator takes.
    pub fn to_spec(&self) -> WheelchairProfileSpec {
        WheelchairProfileSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            width_cm: self.width_cm,
            length_cm: self.length_cm,
            min_door_width_cm: self.min_door_width_cm,
            max_step_height_cm: self.max_step_height_cm,
            max_slope_percent: self.max_slope_percent,
            can_handle_gravel: self.can_handle_gravel,
            can_handle_grass: self.can_handle_grass,
            wheelchair_type: self.kind(),
            is_default: self.is_default,
        }
    }
}

/// DTO for creating a new wheelchair profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWheelchairProfile {
    pub name: String,
    pub description: Option<String>,
    pub width_cm: f64,
    pub length_cm: f64,
    pub min_door_width_cm: f64,
    pub max_step_height_cm: Option<f64>,
    pub max_slope_percent: Option<f64>,
    pub can_handle_gravel: Option<bool>,
    pub can_handle_grass: Option<bool>,
    pub wheelchair_type: Option<String>,
    pub is_default: Option<bool>,
}
