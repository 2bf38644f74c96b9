//! Account handlers.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::models::NewUser;
use crate::response::{success_created, success_one};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

pub async fn me(user: CurrentUser) -> impl IntoResponse {
    success_one(user.0)
}

/// Registration body. The password arrives already hashed by the
/// authenticator in front of this service.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password_hash: String,
}

impl From<RegisterBody> for NewUser {
    fn from(body: RegisterBody) -> Self {
        NewUser {
            name: body.name.trim().to_string(),
            email: body.email.trim().to_string(),
            phone: body.phone.trim().to_string(),
            password_hash: body.password_hash.into_bytes(),
        }
    }
}

/// Unauthenticated. Creates an inactive account awaiting its activation code.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.services.users.register(body.into()).await?;
    Ok(success_created(user))
}

/// Soft-deletes the caller's account.
pub async fn delete_me(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    state.services.users.delete(user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ActivateBody {
    #[serde(default)]
    pub email: String,
    pub code: i32,
}

/// Unauthenticated: the account is not active yet.
pub async fn activate(
    State(state): State<AppState>,
    Json(body): Json<ActivateBody>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.services.users.activate(body.email.trim(), body.code).await?;
    Ok(success_one(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_body_is_trimmed_and_hash_kept_verbatim() {
        let body: RegisterBody = serde_json::from_str(
            r#"{"name": " Ana ", "email": "ana@example.com ", "phone": "555", "password_hash": "$2b$12$abc"}"#,
        )
        .unwrap();
        let user = NewUser::from(body);
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.password_hash, b"$2b$12$abc".to_vec());
    }
}
