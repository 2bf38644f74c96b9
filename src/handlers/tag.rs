//! Tag handlers.

use super::PageParams;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::models::TagInput;
use crate::repository::TAG_SORT_SAFELIST;
use crate::response::{success_created, success_one, success_page};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let filters = page.into_filters("name", TAG_SORT_SAFELIST);
    let (tags, meta) = state.services.tags.list(user.id(), &filters).await?;
    Ok(success_page(tags, meta))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<TagInput>,
) -> Result<impl IntoResponse, AppError> {
    let tag = state.services.tags.create(user.id(), input).await?;
    Ok(success_created(tag))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tag = state.services.tags.get(id, user.id()).await?;
    Ok(success_one(tag))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<TagInput>,
) -> Result<impl IntoResponse, AppError> {
    let tag = state.services.tags.update(id, user.id(), input).await?;
    Ok(success_one(tag))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.services.tags.delete(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
