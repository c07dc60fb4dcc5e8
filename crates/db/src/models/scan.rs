//! Scan entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wheelway_core::scan::ScanStatus;
use wheelway_core::types::{DbId, Timestamp};
use wheelway_core::CoreError;

/// A row from the `scans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scan {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Scan {
    /// Parse the stored status column.
    pub fn scan_status(&self) -> Result<ScanStatus, CoreError> {
        ScanStatus::from_str(&self.status)
    }
}

/// DTO for creating a new scan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScan {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// DTO for updating an existing scan.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateScan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}
