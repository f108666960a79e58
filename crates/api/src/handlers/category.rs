//! Category endpoints.
//!
//! Mutations are multipart (`name` text field plus an optional `image`
//! file part); reads are plain GETs.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storydeck_db::models::category::Category;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::FormData;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for category search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// GET /api/v1/categories
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.categories.get_all().await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/search?q=...
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = state.categories.search(&params.q).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = state.categories.get(id).await?;
    Ok(Json(DataResponse { data: category }))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    let mut form = FormData::collect(multipart).await?;
    let name = form.require_text("name")?.to_string();
    let image = form.take_file("image");

    let category = state.categories.create(name, image).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Category>>> {
    let mut form = FormData::collect(multipart).await?;
    let name = form.text("name").map(str::to_string);
    let image = form.take_file("image");

    let category = state.categories.update(id, name, image).await?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
