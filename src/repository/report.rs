use super::{list, prepare};
use crate::error::AppError;
use crate::mapper::select_columns;
use crate::models::{MonthlyReport, MoodDistribution, MoodLabel, MoodReport, TagCount, TagDistribution, TagReport};
use crate::sql::Params;
use chrono::{Months, NaiveDate};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// Read-only aggregates over a user's live day-logs. Percentages are of the
/// report's own total, rounded to two places.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    timeout: Duration,
}

impl ReportRepository {
    pub fn new(timeout: Duration) -> Self {
        ReportRepository { timeout }
    }

    pub async fn monthly(&self, db: &PgPool, user_id: Uuid, year: i32, month: u32) -> Result<MonthlyReport, AppError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| AppError::invalid("month", "invalid year or month"))?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::invalid("year", "out of range"))?;
        let params = || {
            Params::new()
                .set("user_id", user_id)
                .set("start", start)
                .set("end", end)
        };

        let moods = format!(
            r#"
            SELECT {}
            FROM (
                SELECT
                    dl.mood_label,
                    count(*) AS count,
                    round(count(*) * 100.0 / sum(count(*)) OVER (), 2)::float8 AS percentage
                FROM day_logs dl
                WHERE
                    dl.user_id = :user_id
                    AND dl.deleted = false
                    AND dl.date >= :start
                    AND dl.date < :end
                GROUP BY dl.mood_label
            ) r
            ORDER BY r.mood_label
            "#,
            select_columns::<MoodDistribution>("r")
        );
        let q = prepare(&moods, &params())?;
        let distribution = list(db, &q, self.timeout).await?;

        let tags = format!(
            r#"
            SELECT {}
            FROM (
                SELECT t.name AS tag, count(*) AS count
                FROM day_logs dl
                JOIN log_tags lt ON lt.log_id = dl.id
                JOIN tags t ON t.id = lt.tag_id
                WHERE
                    dl.user_id = :user_id
                    AND dl.deleted = false
                    AND t.deleted = false
                    AND dl.date >= :start
                    AND dl.date < :end
                GROUP BY t.name
            ) r
            ORDER BY r.count DESC, r.tag ASC
            "#,
            select_columns::<TagCount>("r")
        );
        let q = prepare(&tags, &params())?;
        let tags = list(db, &q, self.timeout).await?;

        Ok(MonthlyReport {
            year,
            month,
            distribution,
            tags,
        })
    }

    /// Mood distribution across entries carrying `tag` (case-insensitive).
    pub async fn by_tag(&self, db: &PgPool, user_id: Uuid, tag: &str) -> Result<TagReport, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM (
                SELECT
                    dl.mood_label,
                    count(*) AS count,
                    round(count(*) * 100.0 / sum(count(*)) OVER (), 2)::float8 AS percentage
                FROM tags t
                JOIN log_tags lt ON lt.tag_id = t.id
                JOIN day_logs dl ON dl.id = lt.log_id
                WHERE
                    dl.user_id = :user_id
                    AND dl.deleted = false
                    AND t.deleted = false
                    AND lower(t.name) = lower(:tag)
                GROUP BY dl.mood_label
            ) r
            ORDER BY r.mood_label
            "#,
            select_columns::<MoodDistribution>("r")
        );
        let q = prepare(&sql, &Params::new().set("user_id", user_id).set("tag", tag))?;
        Ok(TagReport {
            tag: tag.to_string(),
            distribution: list(db, &q, self.timeout).await?,
        })
    }

    /// Tag distribution across entries with `mood_label`.
    pub async fn by_mood(&self, db: &PgPool, user_id: Uuid, mood_label: MoodLabel) -> Result<MoodReport, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM (
                SELECT
                    t.name AS tag,
                    count(*) AS count,
                    round(count(*) * 100.0 / sum(count(*)) OVER (), 2)::float8 AS percentage
                FROM day_logs dl
                JOIN log_tags lt ON lt.log_id = dl.id
                JOIN tags t ON t.id = lt.tag_id
                WHERE
                    dl.user_id = :user_id
                    AND dl.deleted = false
                    AND t.deleted = false
                    AND dl.mood_label = :mood
                GROUP BY t.name
            ) r
            ORDER BY r.count DESC, r.tag ASC
            "#,
            select_columns::<TagDistribution>("r")
        );
        let q = prepare(&sql, &Params::new().set("user_id", user_id).set("mood", mood_label))?;
        Ok(MoodReport {
            mood_label,
            distribution: list(db, &q, self.timeout).await?,
        })
    }
}
