//! Story endpoints.
//!
//! The story list is paginated and sortable; mutations are multipart so a
//! thumbnail (or slide image) can travel with the text fields. The acting
//! user comes from the `x-user-id` header.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storydeck_core::listing::{StorySort, DEFAULT_PAGE_LIMIT};
use storydeck_db::models::slide::Slide;
use storydeck_db::models::story::{Story, StoryDetail, StoryStatus};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::{FormData, UserId};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the story list.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// e.g. `created_at desc`, `title asc`.
    pub sort: Option<String>,
}

/// Query parameters for story search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// GET /api/v1/stories
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Story>>>> {
    let sort = match params.sort.as_deref() {
        Some(raw) => raw
            .parse::<StorySort>()
            .map_err(AppError::BadRequest)?,
        None => StorySort::default(),
    };
    let stories = state
        .stories
        .get_all(
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            sort,
        )
        .await?;
    Ok(Json(DataResponse { data: stories }))
}

/// GET /api/v1/stories/search?q=...
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Story>>>> {
    let stories = state.stories.search(&params.q).await?;
    Ok(Json(DataResponse { data: stories }))
}

/// GET /api/v1/stories/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<StoryDetail>>> {
    let detail = state.stories.get(id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/stories
pub async fn create(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Story>>)> {
    let mut form = FormData::collect(multipart).await?;
    let input = storydeck_content::story::CreateStory {
        title: form.require_text("title")?.to_string(),
        description: form.require_text("description")?.to_string(),
        category_uuid: form.require_parse("category_id")?,
        user_id,
    };
    let image = form.take_file("image");

    let story = state.stories.create(input, image).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: story })))
}

/// PUT /api/v1/stories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Story>>> {
    let mut form = FormData::collect(multipart).await?;
    let status = match form.text("status") {
        Some(raw) => Some(
            StoryStatus::parse_public(raw)
                .ok_or_else(|| AppError::BadRequest(format!("invalid status '{raw}'")))?,
        ),
        None => None,
    };
    let changes = storydeck_content::story::UpdateStory {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        status,
        category_uuid: form.parse("category_id")?,
    };
    let image = form.take_file("image");

    let story = state.stories.update(id, changes, image).await?;
    Ok(Json(DataResponse { data: story }))
}

/// DELETE /api/v1/stories/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    state.stories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/stories/{id}/slides
pub async fn add_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Slide>>)> {
    let mut form = FormData::collect(multipart).await?;
    let content = form.text("content").unwrap_or_default().to_string();
    let sequence: i32 = form.require_parse("sequence")?;
    let image = form.take_file("image");

    let slide = state.stories.add_slide(id, content, sequence, image).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: slide })))
}
