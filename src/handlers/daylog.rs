//! Day-log handlers.

use super::PageParams;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::models::{DaylogInput, DaylogPatch, MoodLabel};
use crate::repository::{DaylogQuery, DAYLOG_SORT_SAFELIST};
use crate::response::{success_created, success_many, success_one, success_page};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

/// Query string of `GET /v1/daylogs`. Paging fields are spelled out because
/// `serde_urlencoded` cannot parse numbers through `#[serde(flatten)]`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub mood: Option<String>,
    pub from: Option<NaiveDate>,
}

impl ListParams {
    fn into_query(self) -> Result<(DaylogQuery, PageParams), AppError> {
        let mood = match self.mood.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Some(
                raw.parse::<MoodLabel>()
                    .map_err(|e| AppError::BadRequest(format!("mood: {e}")))?,
            ),
            None => None,
        };
        let query = DaylogQuery {
            description: self.description.unwrap_or_default(),
            tag: self.tag.unwrap_or_default(),
            mood,
            from: self.from,
        };
        let page = PageParams {
            page: self.page,
            page_size: self.page_size,
            sort: self.sort,
        };
        Ok((query, page))
    }
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (query, page) = params.into_query()?;
    let filters = page.into_filters("-date", DAYLOG_SORT_SAFELIST);
    let (logs, meta) = state.services.daylogs.list(user.id(), &query, &filters).await?;
    Ok(success_page(logs, meta))
}

pub async fn list_by_year(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(year): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let logs = state.services.daylogs.list_by_year(user.id(), year).await?;
    Ok(success_many(logs))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<DaylogInput>,
) -> Result<impl IntoResponse, AppError> {
    let log = state.services.daylogs.create(user.id(), input).await?;
    Ok(success_created(log))
}

pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let log = state.services.daylogs.get(id, user.id()).await?;
    Ok(success_one(log))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<DaylogPatch>,
) -> Result<impl IntoResponse, AppError> {
    let log = state.services.daylogs.update(id, user.id(), patch).await?;
    Ok(success_one(log))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.services.daylogs.delete(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_filter_is_parsed_or_rejected() {
        let params = ListParams {
            mood: Some("good".into()),
            ..Default::default()
        };
        let (query, _) = params.into_query().unwrap();
        assert_eq!(query.mood, Some(MoodLabel::Good));

        let params = ListParams {
            mood: Some("great".into()),
            ..Default::default()
        };
        assert!(matches!(params.into_query(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn blank_mood_means_any() {
        let params = ListParams {
            mood: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(params.into_query().unwrap().0.mood, None);
    }
}
