//! Route definitions for the `/scans` resource.
//!
//! Also nests image and analysis routes under `/scans/{scan_id}/...` and
//! mounts the world-model and guide endpoints.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{analysis, image, navigation, scan};
use crate::state::AppState;

/// Routes mounted at `/scans`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PATCH  /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// GET    /{scan_id}/images                  -> list_by_scan
/// POST   /{scan_id}/images                  -> upload (multipart)
/// POST   /{scan_id}/images/reorder          -> reorder
/// DELETE /{scan_id}/images/{image_id}       -> delete
/// GET    /{scan_id}/images/{image_id}/file  -> serve_file
///
/// POST   /{scan_id}/analyze                 -> start
/// GET    /{scan_id}/analysis                -> get_result
/// POST   /{scan_id}/analysis/cancel         -> cancel
/// GET    /{scan_id}/analysis/barriers       -> list_scan_barriers
///
/// GET    /{scan_id}/world-model             -> get_world_model
/// GET    /{scan_id}/guide                   -> get_guide
/// POST   /{scan_id}/guide                   -> generate
/// ```
pub fn router() -> Router<AppState> {
    let image_routes = Router::new()
        .route("/", get(image::list_by_scan).post(image::upload))
        .route("/reorder", post(image::reorder))
        .route("/{image_id}", delete(image::delete))
        .route("/{image_id}/file", get(image::serve_file));

    let analysis_routes = Router::new()
        .route("/", get(analysis::get_result))
        .route("/cancel", post(analysis::cancel))
        .route("/barriers", get(analysis::list_scan_barriers));

    Router::new()
        .route("/", get(scan::list).post(scan::create))
        .route(
            "/{id}",
            get(scan::get_by_id)
                .patch(scan::update)
                .delete(scan::delete),
        )
        .route("/{scan_id}/analyze", post(analysis::start))
        .route("/{scan_id}/world-model", get(navigation::get_world_model))
        .route(
            "/{scan_id}/guide",
            get(navigation::get_guide).post(navigation::generate),
        )
        .nest("/{scan_id}/images", image_routes)
        .nest("/{scan_id}/analysis", analysis_routes)
}
