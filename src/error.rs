//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name -> message, as collected by the validator.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Entity definitions that cannot be mapped onto a query or a row.
/// These are programming errors, not user errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("cannot bind {entity}: row has {columns} columns, entity expects {expected}")]
    Bind {
        entity: &'static str,
        columns: usize,
        expected: usize,
    },
    #[error("unsupported scan type for column {column}: sql type {sql_type}")]
    UnsupportedScanType { column: &'static str, sql_type: String },
    #[error("query references :{0} but no value was supplied")]
    MissingParameter(String),
    #[error("parameter :{0} is never referenced by the query")]
    UnusedParameter(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,
    #[error("a record with this {field} already exists")]
    AlreadyExists { field: &'static str },
    #[error("invalid data")]
    InvalidData(FieldErrors),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{source}; rollback failed: {rollback}")]
    RollbackFailed {
        source: Box<AppError>,
        rollback: sqlx::Error,
    },
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.to_string());
        AppError::InvalidData(errors)
    }
}

/// Translate a unique-constraint violation into `AlreadyExists` using a
/// (constraint name, field) table. Anything else passes through unchanged.
pub fn translate_unique(err: AppError, constraints: &[(&str, &'static str)]) -> AppError {
    let field = match &err {
        AppError::Db(sqlx::Error::Database(db)) => db
            .constraint()
            .and_then(|name| constraints.iter().find(|(c, _)| *c == name))
            .map(|(_, field)| *field),
        _ => None,
    };
    match field {
        Some(field) => AppError::AlreadyExists { field },
        None => err,
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) | AppError::Map(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::EditConflict => (StatusCode::CONFLICT, "edit_conflict"),
            AppError::AlreadyExists { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "already_exists"),
            AppError::InvalidData(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Db(_) | AppError::RollbackFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let details = match &self {
            AppError::InvalidData(errors) => serde_json::to_value(errors).ok(),
            AppError::AlreadyExists { field } => {
                let mut map = serde_json::Map::new();
                map.insert(field.to_string(), serde_json::Value::String(self.to_string()));
                Some(serde_json::Value::Object(map))
            }
            _ => None,
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "the server encountered a problem and could not process your request".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
