//! Chapter endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use storydeck_content::chapter::NewChapterSlide;
use storydeck_db::models::chapter::{Chapter, ChapterDetail};
use storydeck_db::models::slide::Slide;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::FormData;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/stories/{id}/chapters
pub async fn create(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<DataResponse<Chapter>>)> {
    let chapter = state.chapters.create(story_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: chapter })))
}

/// GET /api/v1/chapters/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<ChapterDetail>>> {
    let detail = state.chapters.get(id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/chapters/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    state.chapters.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chapters/{id}/slides
pub async fn add_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Slide>>)> {
    let mut form = FormData::collect(multipart).await?;
    let input = NewChapterSlide {
        content: form.text("content").unwrap_or_default().to_string(),
        sequence: form.require_parse("sequence")?,
        image: form.take_file("image"),
        audio: form.take_file("audio"),
    };

    let slide = state.chapters.add_slide(id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: slide })))
}
