//! Story entity model, status enum, and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storydeck_core::types::{DbId, Timestamp};
use uuid::Uuid;

use crate::models::category::Category;
use crate::models::slide::Slide;

/// Story lifecycle status.
///
/// `Pending` is a transient creation-time state: the row is inserted as
/// `pending` before its thumbnail is uploaded and flipped to `Draft` once
/// asset processing completes. It never survives a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "story_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    Pending,
    Draft,
    Published,
}

impl StoryStatus {
    /// Parse a caller-supplied status. `pending` is internal-only and is
    /// rejected here.
    pub fn parse_public(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// A story row from the `stories` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Story {
    /// Surrogate key, skipped in both serde directions so it cannot
    /// collide with the `"id"` the uuid is exposed under.
    #[serde(skip)]
    pub id: DbId,
    #[serde(rename = "id")]
    pub uuid: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub dominant_color: String,
    #[serde(skip)]
    pub category_id: DbId,
    pub user_id: String,
    pub slide_count: i32,
    pub status: StoryStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A story with its owning category and ordered slides attached.
#[derive(Debug, Clone, Serialize)]
pub struct StoryDetail {
    #[serde(flatten)]
    pub story: Story,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub slides: Vec<Slide>,
}

/// Insert DTO for a new story. The thumbnail is attached by a second write
/// after the blob upload completes.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub uuid: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: DbId,
    pub user_id: String,
    pub status: StoryStatus,
}
