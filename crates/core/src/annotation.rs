//! Per-image annotation produced by the vision analyzer: space
//! classification, accessibility features, detected barriers, and a 0-100
//! accessibility score.
//!
//! Annotations are ephemeral: they feed the world-model builder and the
//! guide generator directly and are never persisted as their own entity.

use serde::{Deserialize, Serialize};

use crate::barrier::DetectedBarrier;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Score assumed when an image has no recorded accessibility score.
pub const DEFAULT_ACCESSIBILITY_SCORE: f64 = 50.0;

/// Score assigned to an image whose analysis failed.
pub const FAILED_ACCESSIBILITY_SCORE: f64 = 0.0;

/// Lighting descriptor assumed when the analyzer omits one.
pub const DEFAULT_LIGHTING: &str = "adequate";

/// Floor-type descriptor assumed when the analyzer omits one.
pub const DEFAULT_FLOOR_TYPE: &str = "unknown";

// ---------------------------------------------------------------------------
// Space type
// ---------------------------------------------------------------------------

/// Classification of the space shown in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    Entrance,
    Corridor,
    Room,
    Stairway,
    Elevator,
    Bathroom,
    Outdoor,
    Parking,
    Other,
}

impl SpaceType {
    /// Return the space type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entrance => "entrance",
            Self::Corridor => "corridor",
            Self::Room => "room",
            Self::Stairway => "stairway",
            Self::Elevator => "elevator",
            Self::Bathroom => "bathroom",
            Self::Outdoor => "outdoor",
            Self::Parking => "parking",
            Self::Other => "other",
        }
    }

    /// Capitalized label used in guide step titles.
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Entrance => "Entrance",
            Self::Corridor => "Corridor",
            Self::Room => "Room",
            Self::Stairway => "Stairway",
            Self::Elevator => "Elevator",
            Self::Bathroom => "Bathroom",
            Self::Outdoor => "Outdoor",
            Self::Parking => "Parking",
            Self::Other => "Other",
        }
    }

    /// Strict parse for trusted input.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::parse(s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid space type '{s}'")))
    }

    /// Lenient parse for analyzer output: unknown strings become
    /// [`SpaceType::Other`].
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Other)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "entrance" => Some(Self::Entrance),
            "corridor" => Some(Self::Corridor),
            "room" => Some(Self::Room),
            "stairway" => Some(Self::Stairway),
            "elevator" => Some(Self::Elevator),
            "bathroom" => Some(Self::Bathroom),
            "outdoor" => Some(Self::Outdoor),
            "parking" => Some(Self::Parking),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Accessibility-relevant features of a space, as reported per image.
///
/// Also embedded verbatim in world-model nodes, so the serde field names are
/// part of the persisted graph format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceFeatures {
    #[serde(default)]
    pub has_ramp: bool,
    #[serde(default)]
    pub has_handrails: bool,
    #[serde(default)]
    pub has_elevator: bool,
    #[serde(default = "default_lighting")]
    pub lighting: String,
    #[serde(default = "default_floor_type")]
    pub floor_type: String,
}

fn default_lighting() -> String {
    DEFAULT_LIGHTING.to_string()
}

fn default_floor_type() -> String {
    DEFAULT_FLOOR_TYPE.to_string()
}

impl Default for SpaceFeatures {
    fn default() -> Self {
        Self {
            has_ramp: false,
            has_handrails: false,
            has_elevator: false,
            lighting: default_lighting(),
            floor_type: default_floor_type(),
        }
    }
}

// ---------------------------------------------------------------------------
// Image annotation
// ---------------------------------------------------------------------------

/// Everything the analyzer reports about one image.
///
/// Decoded leniently: defaults keep partial analyzer documents usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotation {
    #[serde(default = "default_space_type")]
    pub space_type: SpaceType,
    #[serde(default)]
    pub features: SpaceFeatures,
    #[serde(default)]
    pub barriers: Vec<DetectedBarrier>,
    #[serde(default = "default_score")]
    pub accessibility_score: f64,
    #[serde(default)]
    pub overall_description: String,
    /// Set when the analyzer call for this image failed; the annotation is
    /// then a degraded placeholder (score 0, no barriers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_space_type() -> SpaceType {
    SpaceType::Other
}

fn default_score() -> f64 {
    DEFAULT_ACCESSIBILITY_SCORE
}

impl Default for ImageAnnotation {
    fn default() -> Self {
        Self {
            space_type: SpaceType::Other,
            features: SpaceFeatures::default(),
            barriers: Vec::new(),
            accessibility_score: DEFAULT_ACCESSIBILITY_SCORE,
            overall_description: String::new(),
            error: None,
        }
    }
}

impl ImageAnnotation {
    /// Degraded annotation standing in for a failed analyzer call.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            accessibility_score: FAILED_ACCESSIBILITY_SCORE,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Clamp an accessibility score into the 0-100 range.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return DEFAULT_ACCESSIBILITY_SCORE;
    }
    score.clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
