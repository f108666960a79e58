//! Chapter entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storydeck_core::types::{DbId, Timestamp};
use uuid::Uuid;

use crate::models::slide::Slide;

/// A chapter row from the `chapters` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chapter {
    /// Surrogate key, skipped in both serde directions so it cannot
    /// collide with the `"id"` the uuid is exposed under.
    #[serde(skip)]
    pub id: DbId,
    #[serde(rename = "id")]
    pub uuid: Uuid,
    #[serde(skip)]
    pub story_id: DbId,
    pub slide_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A chapter with its ordered slides attached.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterDetail {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub slides: Vec<Slide>,
}

/// Insert DTO for a new chapter.
#[derive(Debug, Clone)]
pub struct NewChapter {
    pub uuid: Uuid,
    pub story_id: DbId,
}
