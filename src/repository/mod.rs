//! Data access: generic executors, pagination, the unit of work and the
//! per-table repositories built on them.

pub mod executor;
pub mod pagination;
pub mod unit_of_work;

mod daylog;
mod report;
mod tag;
mod user;

pub use daylog::{DaylogQuery, DaylogRepository, DAYLOG_SORT_SAFELIST};
pub use executor::{execute, find_one, get_one, list, paginated_list};
pub use pagination::{calculate_metadata, Filters, Metadata};
pub use report::ReportRepository;
pub use tag::{TagRepository, TAG_SORT_SAFELIST};
pub use unit_of_work::{run_in_transaction, TransactionHandle, TransactionSource};
pub use user::UserRepository;

use crate::error::AppError;
use crate::sql::{minify, rewrite, Params, QueryBuf};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Rewrite a named template and log the statement.
fn prepare(template: &str, params: &Params) -> Result<QueryBuf, AppError> {
    let query = rewrite(template, params)?;
    tracing::debug!(sql = %minify(&query.sql), "query");
    Ok(query)
}

/// Columns an INSERT hands back.
#[derive(Debug, Default)]
struct Inserted {
    id: Uuid,
    version: i32,
    created_at: DateTime<Utc>,
}

crate::impl_entity!(Inserted {
    id: column("id"),
    version: column("version"),
    created_at: column("created_at"),
});

/// Columns a versioned UPDATE hands back.
#[derive(Debug, Default)]
struct Updated {
    version: i32,
    updated_at: Option<DateTime<Utc>>,
}

crate::impl_entity!(Updated {
    version: column("version"),
    updated_at: column("updated_at"),
});

/// A bare key.
#[derive(Debug, Default)]
struct Key {
    id: Uuid,
}

crate::impl_entity!(Key { id: column("id") });
