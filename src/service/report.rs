use crate::error::AppError;
use crate::models::{MonthlyReport, MoodLabel, MoodReport, TagReport};
use crate::repository::ReportRepository;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ReportService {
    pool: PgPool,
    reports: ReportRepository,
}

impl ReportService {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        ReportService {
            pool,
            reports: ReportRepository::new(timeout),
        }
    }

    pub async fn monthly(&self, user_id: Uuid, year: i32, month: u32) -> Result<MonthlyReport, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::invalid("month", "must be between 1 and 12"));
        }
        self.reports.monthly(&self.pool, user_id, year, month).await
    }

    pub async fn by_tag(&self, user_id: Uuid, tag: &str) -> Result<TagReport, AppError> {
        if tag.trim().is_empty() {
            return Err(AppError::invalid("tag", "must be provided"));
        }
        self.reports.by_tag(&self.pool, user_id, tag.trim()).await
    }

    pub async fn by_mood(&self, user_id: Uuid, mood_label: MoodLabel) -> Result<MoodReport, AppError> {
        self.reports.by_mood(&self.pool, user_id, mood_label).await
    }
}
