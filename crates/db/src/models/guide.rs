//! Guide entity models and DTOs.
//!
//! One guide per scan; regeneration replaces the stored row. Steps and
//! critical alerts are stored as JSON documents in the shapes defined by
//! `wheelway_core::guide`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wheelway_core::guide::NavigationStep;
use wheelway_core::types::{DbId, Timestamp};

/// A row from the `guides` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Guide {
    pub id: DbId,
    pub scan_id: DbId,
    pub wheelchair_profile_id: Option<DbId>,
    pub title: String,
    pub summary: String,
    pub steps_json: serde_json::Value,
    pub critical_alerts_json: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Guide {
    /// Decode the stored steps document.
    pub fn steps(&self) -> Result<Vec<NavigationStep>, serde_json::Error> {
        serde_json::from_value(self.steps_json.clone())
    }

    /// Decode the stored critical alerts document.
    pub fn critical_alerts(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_value(self.critical_alerts_json.clone())
    }
}

/// DTO for persisting a generated guide.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGuide {
    pub scan_id: DbId,
    pub wheelchair_profile_id: Option<DbId>,
    pub title: String,
    pub summary: String,
    pub steps_json: serde_json::Value,
    pub critical_alerts_json: serde_json::Value,
}
