//! Request handlers for the wheelway API.
//!
//! Each submodule provides async handler functions for one resource area.
//! Handlers delegate to the repositories in `wheelway_db` and map errors
//! via [`AppError`].

pub mod analysis;
pub mod image;
pub mod navigation;
pub mod profile;
pub mod scan;

use wheelway_core::error::CoreError;
use wheelway_core::types::DbId;
use wheelway_db::models::scan::Scan;
use wheelway_db::repositories::ScanRepo;
use wheelway_db::DbPool;

use crate::error::AppError;

/// Load a scan or surface the standard 404.
pub(crate) async fn require_scan(pool: &DbPool, id: DbId) -> Result<Scan, AppError> {
    ScanRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Scan", id }))
}
