//! Wheelchair profiles: chair geometry and terrain capabilities used to
//! tailor navigation guides, plus the built-in profiles that seed an empty
//! store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a profile name.
pub const MAX_PROFILE_NAME_LEN: usize = 255;

/// Maximum length of a profile description.
pub const MAX_PROFILE_DESCRIPTION_LEN: usize = 1000;

/// Default maximum step height a chair can clear, in centimeters.
pub const DEFAULT_MAX_STEP_HEIGHT_CM: f64 = 2.0;

/// Default maximum slope a chair can climb, in percent grade.
pub const DEFAULT_MAX_SLOPE_PERCENT: f64 = 8.0;

// ---------------------------------------------------------------------------
// Wheelchair type
// ---------------------------------------------------------------------------

/// Broad wheelchair category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelchairType {
    Manual,
    Electric,
    Sport,
    Pediatric,
    Bariatric,
}

impl WheelchairType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Electric => "electric",
            Self::Sport => "sport",
            Self::Pediatric => "pediatric",
            Self::Bariatric => "bariatric",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "manual" => Ok(Self::Manual),
            "electric" => Ok(Self::Electric),
            "sport" => Ok(Self::Sport),
            "pediatric" => Ok(Self::Pediatric),
            "bariatric" => Ok(Self::Bariatric),
            _ => Err(CoreError::Validation(format!(
                "Invalid wheelchair type '{s}'"
            ))),
        }
    }

    /// Parse, coercing unknown values to [`WheelchairType::Manual`].
    pub fn parse_lossy(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Manual)
    }
}

// ---------------------------------------------------------------------------
// Profile spec
// ---------------------------------------------------------------------------

/// Domain-level wheelchair profile, independent of storage.
///
/// The guide generator only reads `min_door_width_cm` today; the remaining
/// fields describe the chair for clients and future route filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelchairProfileSpec {
    pub name: String,
    pub description: Option<String>,
    pub width_cm: f64,
    pub length_cm: f64,
    pub min_door_width_cm: f64,
    pub max_step_height_cm: f64,
    pub max_slope_percent: f64,
    pub can_handle_gravel: bool,
    pub can_handle_grass: bool,
    pub wheelchair_type: WheelchairType,
    pub is_default: bool,
}

/// The built-in profiles used to seed an empty profile store.
///
/// Exactly one of them (`Standard Manual`) is the default.
pub fn builtin_profiles() -> Vec<WheelchairProfileSpec> {
    vec![
        WheelchairProfileSpec {
            name: "Standard Manual".to_string(),
            description: Some("Standard manual wheelchair for adults".to_string()),
            width_cm: 65.0,
            length_cm: 105.0,
            min_door_width_cm: 75.0,
            max_step_height_cm: 2.0,
            max_slope_percent: 8.0,
            can_handle_gravel: false,
            can_handle_grass: false,
            wheelchair_type: WheelchairType::Manual,
            is_default: true,
        },
        WheelchairProfileSpec {
            name: "Standard Electric".to_string(),
            description: Some("Standard electric wheelchair".to_string()),
            width_cm: 70.0,
            length_cm: 120.0,
            min_door_width_cm: 80.0,
            max_step_height_cm: 5.0,
            max_slope_percent: 12.0,
            can_handle_gravel: false,
            can_handle_grass: false,
            wheelchair_type: WheelchairType::Electric,
            is_default: false,
        },
        WheelchairProfileSpec {
            name: "Sport".to_string(),
            description: Some("High-performance sport wheelchair".to_string()),
            width_cm: 60.0,
            length_cm: 90.0,
            min_door_width_cm: 70.0,
            max_step_height_cm: 2.0,
            max_slope_percent: 10.0,
            can_handle_gravel: false,
            can_handle_grass: false,
            wheelchair_type: WheelchairType::Sport,
            is_default: false,
        },
        WheelchairProfileSpec {
            name: "Pediatric".to_string(),
            description: Some("Wheelchair for children".to_string()),
            width_cm: 55.0,
            length_cm: 85.0,
            min_door_width_cm: 65.0,
            max_step_height_cm: 2.0,
            max_slope_percent: 8.0,
            can_handle_gravel: false,
            can_handle_grass: false,
            wheelchair_type: WheelchairType::Pediatric,
            is_default: false,
        },
        WheelchairProfileSpec {
            name: "Bariatric".to_string(),
            description: Some("High-capacity bariatric wheelchair".to_string()),
            width_cm: 80.0,
            length_cm: 130.0,
            min_door_width_cm: 90.0,
            max_step_height_cm: 3.0,
            max_slope_percent: 6.0,
            can_handle_gravel: false,
            can_handle_grass: false,
            wheelchair_type: WheelchairType::Bariatric,
            is_default: false,
        },
    ]
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a profile create payload: name constraints plus strictly
/// positive dimensions.
pub fn validate_profile(spec: &WheelchairProfileSpec) -> Result<(), CoreError> {
    if spec.name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Profile name must not be empty".to_string(),
        ));
    }
    if spec.name.chars().count() > MAX_PROFILE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Profile name exceeds {MAX_PROFILE_NAME_LEN} characters"
        )));
    }
    if let Some(description) = &spec.description {
        if description.chars().count() > MAX_PROFILE_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Profile description exceeds {MAX_PROFILE_DESCRIPTION_LEN} characters"
            )));
        }
    }

    let dimensions = [
        ("width_cm", spec.width_cm),
        ("length_cm", spec.length_cm),
        ("min_door_width_cm", spec.min_door_width_cm),
        ("max_step_height_cm", spec.max_step_height_cm),
        ("max_slope_percent", spec.max_slope_percent),
    ];
    for (field, value) in dimensions {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Profile {field} must be a positive number, got {value}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
