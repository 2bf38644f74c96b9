use super::Validator;
use crate::error::AppError;
use crate::models::{Daylog, DaylogInput, DaylogPatch};
use crate::repository::{run_in_transaction, DaylogQuery, DaylogRepository, Filters, Metadata, TagRepository};
use sqlx::{PgConnection, PgPool};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DaylogService {
    pool: PgPool,
    timeout: Duration,
    daylogs: DaylogRepository,
    tags: TagRepository,
}

impl DaylogService {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        DaylogService {
            pool,
            timeout,
            daylogs: DaylogRepository::new(timeout),
            tags: TagRepository::new(timeout),
        }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: &DaylogQuery,
        filters: &Filters,
    ) -> Result<(Vec<Daylog>, Metadata), AppError> {
        let mut v = Validator::new();
        filters.validate(&mut v);
        v.finish()?;
        self.daylogs.list(&self.pool, user_id, query, filters).await
    }

    pub async fn list_by_year(&self, user_id: Uuid, year: i32) -> Result<Vec<Daylog>, AppError> {
        self.daylogs.list_by_year(&self.pool, user_id, year).await
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Daylog, AppError> {
        self.daylogs.get_by_id(&self.pool, id, user_id).await
    }

    /// Insert the entry, get-or-create each tag and link them, atomically.
    pub async fn create(&self, user_id: Uuid, input: DaylogInput) -> Result<Daylog, AppError> {
        let mut v = Validator::new();
        input.validate(&mut v);
        v.finish()?;

        let mut log = Daylog {
            user_id,
            date: input.date.unwrap_or_default(),
            description: input.description,
            mood_label: input.mood_label.unwrap_or_default(),
            tags: input.tags,
            ..Daylog::default()
        };
        let daylogs = self.daylogs.clone();
        let tags = self.tags.clone();
        let created = run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                daylogs.insert(&mut **tx, &mut log).await?;
                link_tags(&daylogs, &tags, tx, log.id, user_id, &log.tags).await?;
                daylogs.get_by_id(&mut **tx, log.id, user_id).await
            })
        })
        .await?;
        tracing::info!(daylog_id = %created.id, tags = created.tags.len(), "daylog created");
        Ok(created)
    }

    /// Versioned partial update. A `tags` list in the patch replaces the links.
    pub async fn update(&self, id: Uuid, user_id: Uuid, patch: DaylogPatch) -> Result<Daylog, AppError> {
        let mut log = self.get(id, user_id).await?;
        let replace_tags = patch.tags.is_some();
        patch.apply(&mut log);
        let mut v = Validator::new();
        log.validate(&mut v);
        v.finish()?;

        let daylogs = self.daylogs.clone();
        let tags = self.tags.clone();
        run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                daylogs.update(&mut **tx, &mut log).await?;
                if replace_tags {
                    daylogs.unlink_all_tags(&mut **tx, log.id).await?;
                    link_tags(&daylogs, &tags, tx, log.id, user_id, &log.tags).await?;
                }
                daylogs.get_by_id(&mut **tx, log.id, user_id).await
            })
        })
        .await
    }

    /// Soft delete and drop the tag links.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let daylogs = self.daylogs.clone();
        run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                daylogs.delete(&mut **tx, id, user_id).await?;
                daylogs.unlink_all_tags(&mut **tx, id).await?;
                Ok(())
            })
        })
        .await
    }
}

async fn link_tags(
    daylogs: &DaylogRepository,
    tags: &TagRepository,
    conn: &mut PgConnection,
    log_id: Uuid,
    user_id: Uuid,
    names: &[String],
) -> Result<(), AppError> {
    for name in names {
        let tag_id = match tags.find_or_create_id(&mut *conn, name, user_id).await? {
            Some(id) => id,
            None => tags
                .find_or_create_id(&mut *conn, name, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("tag".into()))?,
        };
        daylogs.link_tag(&mut *conn, log_id, tag_id).await?;
    }
    Ok(())
}
