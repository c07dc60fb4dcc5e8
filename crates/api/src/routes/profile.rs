//! Route definitions for the `/wheelchair-profiles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/wheelchair-profiles`.
///
/// ```text
/// GET    /      -> list
/// POST   /      -> create
/// GET    /{id}  -> get_by_id
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::list).post(profile::create))
        .route("/{id}", get(profile::get_by_id).delete(profile::delete))
}
