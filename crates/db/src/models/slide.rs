//! Slide entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storydeck_core::types::{DbId, Timestamp};

/// A slide row. A slide belongs to either a story or a chapter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Slide {
    pub id: DbId,
    #[serde(skip)]
    pub story_id: Option<DbId>,
    #[serde(skip)]
    pub chapter_id: Option<DbId>,
    pub image_url: String,
    pub audio_url: Option<String>,
    pub content: String,
    /// Caller-supplied display order; not guaranteed unique within a
    /// parent (sparse ordering is allowed).
    pub sequence: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new slide. Exactly one of `story_id` / `chapter_id`
/// is set.
#[derive(Debug, Clone)]
pub struct NewSlide {
    pub story_id: Option<DbId>,
    pub chapter_id: Option<DbId>,
    pub image_url: String,
    pub audio_url: Option<String>,
    pub content: String,
    pub sequence: i32,
}
