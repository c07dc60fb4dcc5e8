//! Barrier entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wheelway_core::barrier::{BarrierSeverity, BarrierSummary, BarrierType, BoundingBox};
use wheelway_core::guide::GuideBarrier;
use wheelway_core::types::{DbId, Timestamp};

/// A row from the `barriers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Barrier {
    pub id: DbId,
    pub scan_id: DbId,
    pub image_id: DbId,
    pub barrier_type: String,
    pub severity: String,
    pub description: String,
    pub bounding_box_json: Option<serde_json::Value>,
    pub estimated_width_cm: Option<f64>,
    pub estimated_height_cm: Option<f64>,
    pub estimated_depth_cm: Option<f64>,
    pub recommendation: Option<String>,
    pub confidence: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Barrier {
    /// Typed view of the barrier type column.
    ///
    /// The column is CHECK-constrained to known values, so the lossy parse
    /// never actually coerces for rows this crate wrote.
    pub fn kind(&self) -> BarrierType {
        BarrierType::parse_lossy(&self.barrier_type)
    }

    /// Typed view of the severity column.
    pub fn severity_level(&self) -> BarrierSeverity {
        BarrierSeverity::parse_lossy(&self.severity)
    }

    /// Decode the stored bounding box, if present.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box_json
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Project this row into the summary shape embedded in graphs and
    /// guide steps.
    pub fn to_summary(&self) -> BarrierSummary {
        BarrierSummary {
            id: self.id,
            barrier_type: self.kind(),
            severity: self.severity_level(),
            description: self.description.clone(),
            recommendation: self.recommendation.clone(),
        }
    }

    /// Project this row into the guide generator's input shape.
    pub fn to_guide_barrier(&self) -> GuideBarrier {
        GuideBarrier {
            id: self.id,
            barrier_type: self.kind(),
            severity: self.severity_level(),
            description: self.description.clone(),
            recommendation: self.recommendation.clone(),
            estimated_width_cm: self.estimated_width_cm,
        }
    }
}

/// DTO for creating a new barrier.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBarrier {
    pub scan_id: DbId,
    pub image_id: DbId,
    pub barrier_type: String,
    pub severity: String,
    pub description: String,
    pub bounding_box_json: Option<serde_json::Value>,
    pub estimated_width_cm: Option<f64>,
    pub estimated_height_cm: Option<f64>,
    pub estimated_depth_cm: Option<f64>,
    pub recommendation: Option<String>,
    pub confidence: Option<f64>,
}
