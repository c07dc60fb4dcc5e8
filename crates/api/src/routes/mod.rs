pub mod health;
pub mod profile;
pub mod scan;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /images/{image_id}/barriers              barriers for one image (GET)
///
/// /scans                                   list, create
/// /scans/{id}                              get, update (PATCH), delete
/// /scans/{scan_id}/images                  list, upload (multipart POST)
/// /scans/{scan_id}/images/reorder          reorder (POST)
/// /scans/{scan_id}/images/{image_id}       delete
/// /scans/{scan_id}/images/{image_id}/file  stored image bytes (GET)
/// /scans/{scan_id}/analyze                 start analysis (POST)
/// /scans/{scan_id}/analysis                analysis result (GET)
/// /scans/{scan_id}/analysis/cancel         cancel running analysis (POST)
/// /scans/{scan_id}/analysis/barriers       barriers for scan (GET)
/// /scans/{scan_id}/world-model             traversal graph (GET)
/// /scans/{scan_id}/guide                   get, generate (GET, POST)
///
/// /wheelchair-profiles                     list, create
/// /wheelchair-profiles/{id}                get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Image-scoped barrier lookup, addressed by image id alone.
        .route(
            "/images/{image_id}/barriers",
            get(handlers::analysis::list_image_barriers),
        )
        // Scan routes (also nests images, analysis, and navigation endpoints).
        .nest("/scans", scan::router())
        // Wheelchair profile management.
        .nest("/wheelchair-profiles", profile::router())
}
