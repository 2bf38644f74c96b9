use super::Validator;
use crate::error::AppError;
use crate::models::{Tag, TagInput};
use crate::repository::{run_in_transaction, Filters, Metadata, TagRepository};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TagService {
    pool: PgPool,
    timeout: Duration,
    tags: TagRepository,
}

impl TagService {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        TagService {
            pool,
            timeout,
            tags: TagRepository::new(timeout),
        }
    }

    pub async fn list(&self, user_id: Uuid, filters: &Filters) -> Result<(Vec<Tag>, Metadata), AppError> {
        let mut v = Validator::new();
        filters.validate(&mut v);
        v.finish()?;
        self.tags.list(&self.pool, user_id, filters).await
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Tag, AppError> {
        self.tags.get_by_id(&self.pool, id, user_id).await
    }

    pub async fn create(&self, user_id: Uuid, input: TagInput) -> Result<Tag, AppError> {
        let mut tag = Tag {
            name: input.name.trim().to_string(),
            user_id,
            ..Tag::default()
        };
        let mut v = Validator::new();
        tag.validate(&mut v);
        v.finish()?;

        let tags = self.tags.clone();
        run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                tags.insert(&mut **tx, &mut tag).await?;
                Ok(tag)
            })
        })
        .await
    }

    /// Rename; `input.version` must match the stored version.
    pub async fn update(&self, id: Uuid, user_id: Uuid, input: TagInput) -> Result<Tag, AppError> {
        let version = input
            .version
            .ok_or_else(|| AppError::invalid("version", "must be provided"))?;
        let mut tag = self.get(id, user_id).await?;
        tag.name = input.name.trim().to_string();
        tag.base.version = version;
        let mut v = Validator::new();
        tag.validate(&mut v);
        v.finish()?;

        let tags = self.tags.clone();
        run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                tags.update(&mut **tx, &mut tag).await?;
                Ok(tag)
            })
        })
        .await
    }

    /// Soft delete and drop the tag from every entry.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let tags = self.tags.clone();
        run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                tags.delete(&mut **tx, id, user_id).await?;
                tags.unlink_from_logs(&mut **tx, id).await?;
                Ok(())
            })
        })
        .await
    }
}
