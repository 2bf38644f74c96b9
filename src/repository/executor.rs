//! Generic statement execution over any mapped entity.
//!
//! Every call is bounded by the caller's timeout; an expired timeout drops the
//! in-flight statement and surfaces as an I/O `TimedOut` error.

use super::pagination::{calculate_metadata, Filters, Metadata};
use crate::error::AppError;
use crate::mapper::{Entity, Targets};
use crate::sql::QueryBuf;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Executor, Row};
use std::future::Future;
use std::io;
use std::time::Duration;

/// Await `fut` for at most `timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, sqlx::Error>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("statement exceeded {}ms", timeout.as_millis()),
        ))),
    }
}

/// Fresh `T` populated from `row`, skipping the first `offset` columns.
fn scan<T: Entity>(row: &PgRow, offset: usize) -> Result<T, AppError> {
    let mut entity = T::default();
    Targets::for_entity(&mut entity).scan_at(row, offset)?;
    Ok(entity)
}

/// Every row mapped to `T`. Zero rows is an empty list; the first row that
/// fails to map aborts the call.
pub async fn list<'c, T, X>(executor: X, query: &QueryBuf, timeout: Duration) -> Result<Vec<T>, AppError>
where
    T: Entity,
    X: Executor<'c, Database = Postgres>,
{
    let rows = with_timeout(timeout, query.query().fetch_all(executor)).await?;
    rows.iter().map(|row| scan::<T>(row, 0)).collect()
}

/// One page of `T`. The statement must select `count(*) OVER()` as its first
/// column; the entity columns follow it.
pub async fn paginated_list<'c, T, X>(
    executor: X,
    query: &QueryBuf,
    filters: &Filters,
    timeout: Duration,
) -> Result<(Vec<T>, Metadata), AppError>
where
    T: Entity,
    X: Executor<'c, Database = Postgres>,
{
    let rows = with_timeout(timeout, query.query().fetch_all(executor)).await?;
    let total: i64 = match rows.first() {
        Some(row) => row.try_get(0)?,
        None => 0,
    };
    let items = rows
        .iter()
        .map(|row| scan::<T>(row, 1))
        .collect::<Result<Vec<T>, AppError>>()?;
    Ok((items, calculate_metadata(total, filters.page, filters.page_size)))
}

/// Exactly one `T`; no row is `NotFound` named after the entity.
pub async fn get_one<'c, T, X>(executor: X, query: &QueryBuf, timeout: Duration) -> Result<T, AppError>
where
    T: Entity,
    X: Executor<'c, Database = Postgres>,
{
    find_one(executor, query, timeout)
        .await?
        .ok_or_else(|| AppError::NotFound(T::NAME.to_lowercase()))
}

/// The first row as `T`, if any.
pub async fn find_one<'c, T, X>(executor: X, query: &QueryBuf, timeout: Duration) -> Result<Option<T>, AppError>
where
    T: Entity,
    X: Executor<'c, Database = Postgres>,
{
    let row = with_timeout(timeout, query.query().fetch_optional(executor)).await?;
    row.as_ref().map(|row| scan::<T>(row, 0)).transpose()
}

/// Number of rows affected.
pub async fn execute<'c, X>(executor: X, query: &QueryBuf, timeout: Duration) -> Result<u64, AppError>
where
    X: Executor<'c, Database = Postgres>,
{
    let done = with_timeout(timeout, query.query().execute(executor)).await?;
    Ok(done.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timeout_surfaces_as_io_timed_out() {
        let never = std::future::pending::<Result<(), sqlx::Error>>();
        let err = with_timeout(Duration::from_millis(5), never).await.unwrap_err();
        match err {
            sqlx::Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn completed_future_passes_through() {
        let ready = async { Ok::<_, sqlx::Error>(7) };
        assert_eq!(with_timeout(Duration::from_secs(1), ready).await.unwrap(), 7);
    }
}
