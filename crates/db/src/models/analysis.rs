//! Analysis result entity model.
//!
//! Exactly one row per scan. Re-running an analysis resets the existing row
//! rather than inserting a new one, so the row id is stable across runs. The
//! serialized world model lives on this row as opaque text; nothing else in
//! the schema knows its internal structure.

use serde::Serialize;
use sqlx::FromRow;
use wheelway_core::scan::AnalysisStatus;
use wheelway_core::types::{DbId, Timestamp};
use wheelway_core::world_model::WorldGraph;
use wheelway_core::CoreError;

/// A row from the `analyses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Analysis {
    pub id: DbId,
    pub scan_id: DbId,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub total_images_analyzed: i32,
    pub total_barriers_found: i32,
    pub accessibility_score: Option<f64>,
    #[serde(skip_serializing)]
    pub world_model_json: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Analysis {
    /// Parse the stored status column.
    pub fn run_status(&self) -> Result<AnalysisStatus, CoreError> {
        AnalysisStatus::from_str(&self.status)
    }

    /// Decode the stored world model, if one has been written.
    ///
    /// A row that fails to decode is treated as corrupt rather than absent,
    /// so callers can distinguish "not analyzed yet" from "stored text is
    /// damaged".
    pub fn world_model(&self) -> Result<Option<WorldGraph>, CoreError> {
        match self.world_model_json.as_deref() {
            Some(text) => {
                let graph = WorldGraph::from_json(text).map_err(|err| {
                    CoreError::Internal(format!("stored world model failed to decode: {err}"))
                })?;
                Ok(Some(graph))
            }
            None => Ok(None),
        }
    }
}
