use super::{execute, find_one, get_one, list, paginated_list, prepare, Filters, Inserted, Metadata, Updated};
use crate::error::AppError;
use crate::mapper::select_columns;
use crate::models::{Daylog, MoodLabel};
use crate::sql::{Params, SqlValue};
use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use std::time::Duration;
use uuid::Uuid;

pub const DAYLOG_SORT_SAFELIST: &[&str] = &["date", "mood_label", "created_at", "-date", "-mood_label", "-created_at"];

/// Optional narrowing for the day-log list. Empty strings and `None` match everything.
#[derive(Debug, Clone, Default)]
pub struct DaylogQuery {
    pub description: String,
    pub tag: String,
    pub mood: Option<MoodLabel>,
    pub from: Option<NaiveDate>,
}

/// `[Jan 1 of year, Jan 1 of year + 1)`.
fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), AppError> {
    year.checked_add(1)
        .and_then(|next| NaiveDate::from_ymd_opt(year, 1, 1).zip(NaiveDate::from_ymd_opt(next, 1, 1)))
        .ok_or_else(|| AppError::invalid("year", "out of range"))
}

#[derive(Debug, Clone)]
pub struct DaylogRepository {
    timeout: Duration,
}

impl DaylogRepository {
    pub fn new(timeout: Duration) -> Self {
        DaylogRepository { timeout }
    }

    pub async fn list<'c, X>(
        &self,
        db: X,
        user_id: Uuid,
        query: &DaylogQuery,
        filters: &Filters,
    ) -> Result<(Vec<Daylog>, Metadata), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT count(*) OVER(), {cols}
            FROM day_logs_with_tags dl
            WHERE
                dl.user_id = :user_id
                AND dl.deleted = false
                AND (:description = '' OR to_tsvector('simple', dl.description) @@ plainto_tsquery('simple', :description))
                AND (:tag = '' OR EXISTS (SELECT 1 FROM unnest(dl.tags) AS x(name) WHERE lower(x.name) = lower(:tag)))
                AND (:mood::int IS NULL OR dl.mood_label = :mood)
                AND (:from::date IS NULL OR dl.date >= :from)
            ORDER BY dl.{sort} {dir}, dl.id ASC
            LIMIT :limit OFFSET :offset
            "#,
            cols = select_columns::<Daylog>("dl"),
            sort = filters.sort_column()?,
            dir = filters.sort_direction(),
        );
        let params = Params::new()
            .set("user_id", user_id)
            .set("description", query.description.as_str())
            .set("tag", query.tag.as_str())
            .set("mood", query.mood.map(SqlValue::from).unwrap_or(SqlValue::null_of::<i32>()))
            .set("from", query.from)
            .set("limit", filters.limit())
            .set("offset", filters.offset());
        let q = prepare(&sql, &params)?;
        paginated_list(db, &q, filters, self.timeout).await
    }

    /// Every entry dated within `year`, oldest first.
    pub async fn list_by_year<'c, X>(&self, db: X, user_id: Uuid, year: i32) -> Result<Vec<Daylog>, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let (start, end) = year_bounds(year)?;
        let sql = format!(
            r#"
            SELECT {}
            FROM day_logs_with_tags dl
            WHERE
                dl.user_id = :user_id
                AND dl.deleted = false
                AND dl.date >= :start
                AND dl.date < :end
            ORDER BY dl.date ASC, dl.created_at ASC
            "#,
            select_columns::<Daylog>("dl")
        );
        let params = Params::new()
            .set("user_id", user_id)
            .set("start", start)
            .set("end", end);
        let q = prepare(&sql, &params)?;
        list(db, &q, self.timeout).await
    }

    pub async fn get_by_id<'c, X>(&self, db: X, id: Uuid, user_id: Uuid) -> Result<Daylog, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM day_logs_with_tags dl WHERE dl.id = :id AND dl.user_id = :user_id AND dl.deleted = false",
            select_columns::<Daylog>("dl")
        );
        let q = prepare(&sql, &Params::new().set("id", id).set("user_id", user_id))?;
        get_one(db, &q, self.timeout).await
    }

    pub async fn insert<'c, X>(&self, db: X, log: &mut Daylog) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let params = Params::new()
            .set("user_id", log.user_id)
            .set("date", log.date)
            .set("description", log.description.as_str())
            .set("mood_label", log.mood_label);
        let q = prepare(
            r#"
            INSERT INTO day_logs (user_id, date, description, mood_label, created_by)
            VALUES (:user_id, :date, :description, :mood_label, :user_id)
            RETURNING id, version, created_at
            "#,
            &params,
        )?;
        let row: Inserted = get_one(db, &q, self.timeout).await?;
        log.id = row.id;
        log.base.version = row.version;
        log.base.created_at = row.created_at;
        Ok(())
    }

    /// Versioned update of the scalar fields; tags are linked separately.
    pub async fn update<'c, X>(&self, db: X, log: &mut Daylog) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let params = Params::new()
            .set("id", log.id)
            .set("user_id", log.user_id)
            .set("version", log.base.version)
            .set("date", log.date)
            .set("description", log.description.as_str())
            .set("mood_label", log.mood_label);
        let q = prepare(
            r#"
            UPDATE day_logs SET
                date = :date,
                description = :description,
                mood_label = :mood_label,
                updated_at = NOW(),
                updated_by = :user_id,
                version = version + 1
            WHERE
                id = :id
                AND user_id = :user_id
                AND version = :version
                AND deleted = false
            RETURNING version, updated_at
            "#,
            &params,
        )?;
        let row: Updated = find_one(db, &q, self.timeout).await?.ok_or(AppError::EditConflict)?;
        log.base.version = row.version;
        log.base.updated_at = row.updated_at;
        Ok(())
    }

    /// Soft delete.
    pub async fn delete<'c, X>(&self, db: X, id: Uuid, user_id: Uuid) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            r#"
            UPDATE day_logs SET
                deleted = true,
                updated_at = NOW(),
                updated_by = :user_id
            WHERE
                id = :id
                AND user_id = :user_id
                AND deleted = false
            "#,
            &Params::new().set("id", id).set("user_id", user_id),
        )?;
        match execute(db, &q, self.timeout).await? {
            0 => Err(AppError::NotFound("daylog".into())),
            _ => Ok(()),
        }
    }

    pub async fn link_tag<'c, X>(&self, db: X, log_id: Uuid, tag_id: Uuid) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            "INSERT INTO log_tags (log_id, tag_id) VALUES (:log_id, :tag_id) ON CONFLICT DO NOTHING",
            &Params::new().set("log_id", log_id).set("tag_id", tag_id),
        )?;
        execute(db, &q, self.timeout).await?;
        Ok(())
    }

    pub async fn unlink_all_tags<'c, X>(&self, db: X, log_id: Uuid) -> Result<u64, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            "DELETE FROM log_tags WHERE log_id = :log_id",
            &Params::new().set("log_id", log_id),
        )?;
        execute(db, &q, self.timeout).await
    }
}
