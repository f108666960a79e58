//! Preference endpoints.
//!
//! Unlike the asset-carrying mutations, preference saves are plain JSON.
//! The per-group selection limit lives in `ContentConfig` and is enforced
//! by the service, so a raised `PREFERENCE_GROUP_LIMIT` takes effect here
//! without code changes.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use storydeck_content::preference::PreferenceSelection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::UserId;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/preferences request body.
#[derive(Debug, Deserialize)]
pub struct PreferencePayload {
    #[serde(default)]
    pub stories: Vec<Uuid>,
    #[serde(default)]
    pub lessons: Vec<Uuid>,
    #[serde(default)]
    pub quotes: Vec<Uuid>,
}

/// Typed response for a preference save.
#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub saved: usize,
}

/// POST /api/v1/preferences
pub async fn save(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(payload): Json<PreferencePayload>,
) -> AppResult<Json<DataResponse<SaveResult>>> {
    let saved = state
        .preferences
        .save(
            &user_id,
            PreferenceSelection {
                stories: payload.stories,
                lessons: payload.lessons,
                quotes: payload.quotes,
            },
        )
        .await?;
    Ok(Json(DataResponse {
        data: SaveResult { saved },
    }))
}
