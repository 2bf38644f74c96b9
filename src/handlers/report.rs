//! Report handlers.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::models::MoodLabel;
use crate::response::success_one;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn monthly(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.services.reports.monthly(user.id(), year, month).await?;
    Ok(success_one(report))
}

pub async fn by_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(tag): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.services.reports.by_tag(user.id(), &tag).await?;
    Ok(success_one(report))
}

pub async fn by_mood(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(mood): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mood: MoodLabel = mood
        .parse()
        .map_err(|e| AppError::BadRequest(format!("mood: {e}")))?;
    let report = state.services.reports.by_mood(user.id(), mood).await?;
    Ok(success_one(report))
}
