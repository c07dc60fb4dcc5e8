use std::sync::Arc;

use wheelway_vision::VisionClient;

use crate::config::ServerConfig;
use crate::engine::ActiveAnalyses;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wheelway_db::DbPool,
    /// Server configuration (upload limits, vision analyzer settings).
    pub config: Arc<ServerConfig>,
    /// Vision analyzer client shared by all analysis runs.
    pub vision: Arc<VisionClient>,
    /// Registry of in-flight analysis runs (duplicate rejection, cancellation).
    pub analyses: Arc<ActiveAnalyses>,
}
