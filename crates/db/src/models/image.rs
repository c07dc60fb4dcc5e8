//! Scan image entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wheelway_core::types::{DbId, Timestamp};

/// A row from the `scan_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanImage {
    pub id: DbId,
    pub scan_id: DbId,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sequence_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScanImage {
    /// The stored filename, i.e. the final segment of `file_path`.
    pub fn stored_filename(&self) -> &str {
        self.file_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.file_path)
    }
}

/// DTO for creating a new scan image.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScanImage {
    pub scan_id: DbId,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sequence_order: i32,
}
