//! Mood journal backend: a small entity-relational mapper over sqlx/Postgres
//! and the day-log, tag, user and report API built on it.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mapper;
pub mod migration;
pub mod models;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError, MapError};
pub use mapper::{project, select_columns, Entity, Field, Targets};
pub use migration::apply_migrations;
pub use repository::{run_in_transaction, Filters, Metadata};
pub use routes::{app, MAX_BODY_BYTES};
pub use settings::{LogFormat, Settings};
pub use sql::{rewrite, Params, QueryBuf, SqlValue};
pub use state::AppState;
pub use store::{connect, ensure_database_exists};
