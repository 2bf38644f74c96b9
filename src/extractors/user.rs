//! Identify the caller from the header set by the upstream authenticator.

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The authenticated, activated caller.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

fn user_id_from(parts: &Parts) -> Result<Uuid, AppError> {
    let raw = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
    Uuid::parse_str(raw).map_err(|_| AppError::Unauthorized(format!("invalid {USER_ID_HEADER} header")))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = user_id_from(parts)?;
        let user = state.services.users.authenticate(id).await?;
        Ok(CurrentUser(user))
    }
}
