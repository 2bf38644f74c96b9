use super::{execute, find_one, get_one, paginated_list, prepare, Filters, Inserted, Key, Metadata, Updated};
use crate::error::{translate_unique, AppError};
use crate::mapper::select_columns;
use crate::models::Tag;
use crate::sql::Params;
use sqlx::{Executor, Postgres};
use std::time::Duration;
use uuid::Uuid;

pub const TAG_SORT_SAFELIST: &[&str] = &["name", "created_at", "-name", "-created_at"];

const UNIQUE: &[(&str, &str)] = &[("tags_user_name_key", "name")];

/// Tag columns plus its most recent live day-log (all NULL when unused).
const FROM_WITH_LAST_LOG: &str = r#"
    FROM tags t
    LEFT JOIN LATERAL (
        SELECT d.*
        FROM day_logs_with_tags d
        JOIN log_tags lt ON lt.log_id = d.id
        WHERE lt.tag_id = t.id AND d.deleted = false
        ORDER BY d.date DESC, d.created_at DESC
        LIMIT 1
    ) dl ON true
"#;

#[derive(Debug, Clone)]
pub struct TagRepository {
    timeout: Duration,
}

impl TagRepository {
    pub fn new(timeout: Duration) -> Self {
        TagRepository { timeout }
    }

    pub async fn list<'c, X>(&self, db: X, user_id: Uuid, filters: &Filters) -> Result<(Vec<Tag>, Metadata), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT count(*) OVER(), {cols}
            {FROM_WITH_LAST_LOG}
            WHERE t.user_id = :user_id AND t.deleted = false
            ORDER BY t.{sort} {dir}, t.id ASC
            LIMIT :limit OFFSET :offset
            "#,
            cols = select_columns::<Tag>("t"),
            sort = filters.sort_column()?,
            dir = filters.sort_direction(),
        );
        let params = Params::new()
            .set("user_id", user_id)
            .set("limit", filters.limit())
            .set("offset", filters.offset());
        let q = prepare(&sql, &params)?;
        paginated_list(db, &q, filters, self.timeout).await
    }

    pub async fn get_by_id<'c, X>(&self, db: X, id: Uuid, user_id: Uuid) -> Result<Tag, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {cols}
            {FROM_WITH_LAST_LOG}
            WHERE t.id = :id AND t.user_id = :user_id AND t.deleted = false
            "#,
            cols = select_columns::<Tag>("t"),
        );
        let q = prepare(&sql, &Params::new().set("id", id).set("user_id", user_id))?;
        get_one(db, &q, self.timeout).await
    }

    pub async fn insert<'c, X>(&self, db: X, tag: &mut Tag) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            r#"
            INSERT INTO tags (name, user_id, created_by)
            VALUES (:name, :user_id, :user_id)
            RETURNING id, version, created_at
            "#,
            &Params::new().set("name", tag.name.as_str()).set("user_id", tag.user_id),
        )?;
        let row: Inserted = get_one(db, &q, self.timeout)
            .await
            .map_err(|e| translate_unique(e, UNIQUE))?;
        tag.id = row.id;
        tag.base.version = row.version;
        tag.base.created_at = row.created_at;
        Ok(())
    }

    pub async fn update<'c, X>(&self, db: X, tag: &mut Tag) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let params = Params::new()
            .set("id", tag.id)
            .set("user_id", tag.user_id)
            .set("version", tag.base.version)
            .set("name", tag.name.as_str());
        let q = prepare(
            r#"
            UPDATE tags SET
                name = :name,
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
        let row: Updated = find_one(db, &q, self.timeout)
            .await
            .map_err(|e| translate_unique(e, UNIQUE))?
            .ok_or(AppError::EditConflict)?;
        tag.base.version = row.version;
        tag.base.updated_at = row.updated_at;
        Ok(())
    }

    /// Soft delete.
    pub async fn delete<'c, X>(&self, db: X, id: Uuid, user_id: Uuid) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            r#"
            UPDATE tags SET
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
            0 => Err(AppError::NotFound("tag".into())),
            _ => Ok(()),
        }
    }

    pub async fn unlink_from_logs<'c, X>(&self, db: X, tag_id: Uuid) -> Result<u64, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            "DELETE FROM log_tags WHERE tag_id = :tag_id",
            &Params::new().set("tag_id", tag_id),
        )?;
        execute(db, &q, self.timeout).await
    }

    /// Id of the user's live tag named `name` (case-insensitive), creating it
    /// when absent. `None` means a concurrent insert won the race; the caller
    /// looks it up again.
    pub async fn find_or_create_id<'c, X>(&self, db: X, name: &str, user_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            r#"
            WITH existing AS (
                SELECT id FROM tags
                WHERE user_id = :user_id AND lower(name) = lower(:name) AND deleted = false
            ), created AS (
                INSERT INTO tags (name, user_id, created_by)
                SELECT :name, :user_id, :user_id
                WHERE NOT EXISTS (SELECT 1 FROM existing)
                ON CONFLICT DO NOTHING
                RETURNING id
            )
            SELECT id FROM existing
            UNION ALL
            SELECT id FROM created
            "#,
            &Params::new().set("name", name.trim()).set("user_id", user_id),
        )?;
        let key: Option<Key> = find_one(db, &q, self.timeout).await?;
        Ok(key.map(|k| k.id))
    }
}
