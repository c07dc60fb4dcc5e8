//! Barrier model: obstacle types, severity ordering, and the denormalized
//! summaries embedded in world-model nodes and guide steps.
//!
//! Barrier data originates from the vision analyzer, whose text output is
//! untrusted: the `parse_lossy` constructors coerce unknown enum strings to
//! documented defaults instead of rejecting them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a barrier description.
pub const MAX_BARRIER_DESCRIPTION_LEN: usize = 1000;

/// Maximum length of a barrier recommendation.
pub const MAX_BARRIER_RECOMMENDATION_LEN: usize = 500;

/// Description substituted when the analyzer omits one.
pub const UNKNOWN_BARRIER_DESCRIPTION: &str = "Unknown barrier";

/// Confidence assumed when the analyzer omits one.
pub const DEFAULT_BARRIER_CONFIDENCE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Barrier type
// ---------------------------------------------------------------------------

/// Kind of physical obstacle detected in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierType {
    Step,
    Stairs,
    NarrowDoor,
    NarrowPassage,
    SteepRamp,
    UnevenSurface,
    Obstacle,
    HeavyDoor,
    RevolvingDoor,
    Threshold,
    Gravel,
    Grass,
    Slope,
    Other,
}

impl BarrierType {
    /// Return the barrier type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Stairs => "stairs",
            Self::NarrowDoor => "narrow_door",
            Self::NarrowPassage => "narrow_passage",
            Self::SteepRamp => "steep_ramp",
            Self::UnevenSurface => "uneven_surface",
            Self::Obstacle => "obstacle",
            Self::HeavyDoor => "heavy_door",
            Self::RevolvingDoor => "revolving_door",
            Self::Threshold => "threshold",
            Self::Gravel => "gravel",
            Self::Grass => "grass",
            Self::Slope => "slope",
            Self::Other => "other",
        }
    }

    /// Strict parse for trusted input (query filters, stored rows).
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::parse(s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid barrier type '{s}'")))
    }

    /// Lenient parse for analyzer output: unknown strings become
    /// [`BarrierType::Other`].
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Other)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "step" => Some(Self::Step),
            "stairs" => Some(Self::Stairs),
            "narrow_door" => Some(Self::NarrowDoor),
            "narrow_passage" => Some(Self::NarrowPassage),
            "steep_ramp" => Some(Self::SteepRamp),
            "uneven_surface" => Some(Self::UnevenSurface),
            "obstacle" => Some(Self::Obstacle),
            "heavy_door" => Some(Self::HeavyDoor),
            "revolving_door" => Some(Self::RevolvingDoor),
            "threshold" => Some(Self::Threshold),
            "gravel" => Some(Self::Gravel),
            "grass" => Some(Self::Grass),
            "slope" => Some(Self::Slope),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Barrier severity
// ---------------------------------------------------------------------------

/// Impact level of a barrier. Totally ordered: low < medium < high < critical.
///
/// The derived `Ord` follows declaration order and drives both the per-image
/// worst-severity rating and the per-edge difficulty derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BarrierSeverity {
    /// Numeric rank used when comparing severities across barriers.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Return the severity as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Strict parse for trusted input (query filters, stored rows).
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::parse(s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid barrier severity '{s}'")))
    }

    /// Lenient parse for analyzer output: unknown strings become
    /// [`BarrierSeverity::Medium`].
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Medium)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Barrier values
// ---------------------------------------------------------------------------

/// Normalized bounding box within an image; all fields in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One barrier as reported by the vision analyzer, before persistence.
///
/// Has no identifier yet; the record store assigns one on insert. Also
/// embedded in stored annotation documents, hence the serde derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBarrier {
    pub barrier_type: BarrierType,
    pub severity: BarrierSeverity,
    pub description: String,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub estimated_width_cm: Option<f64>,
    #[serde(default)]
    pub estimated_height_cm: Option<f64>,
    #[serde(default)]
    pub estimated_depth_cm: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_BARRIER_CONFIDENCE
}

/// Denormalized barrier copy embedded in world-model nodes and guide steps.
///
/// A snapshot, not a live reference: deleting the barrier row later does not
/// mutate already-persisted graphs or guides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierSummary {
    pub id: DbId,
    pub barrier_type: BarrierType,
    pub severity: BarrierSeverity,
    pub description: String,
    pub recommendation: Option<String>,
}

/// Highest severity present among `barriers`, or `None` when empty.
pub fn max_severity(barriers: &[BarrierSummary]) -> Option<BarrierSeverity> {
    barriers.iter().map(|b| b.severity).max()
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
