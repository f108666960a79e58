//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storydeck_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    /// Surrogate key, skipped in both serde directions so it cannot
    /// collide with the `"id"` the uuid is exposed under.
    #[serde(skip)]
    pub id: DbId,
    /// External identifier, exposed as `"id"` in API payloads.
    #[serde(rename = "id")]
    pub uuid: Uuid,
    pub name: String,
    pub image_url: String,
    pub dominant_color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub uuid: Uuid,
    pub name: String,
    pub image_url: String,
    pub dominant_color: String,
}
