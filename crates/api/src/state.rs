use std::sync::Arc;

use storydeck_content::{CategoryService, ChapterService, PreferenceService, StoryService};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (used directly only by the health check).
    pub pool: storydeck_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    pub categories: Arc<CategoryService>,
    pub stories: Arc<StoryService>,
    pub chapters: Arc<ChapterService>,
    pub preferences: Arc<PreferenceService>,
}
