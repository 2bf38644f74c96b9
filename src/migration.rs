//! Schema bootstrap: tables, partial unique indexes and the tagged day-log view.
//! Every statement is idempotent, so this runs on every start.

use crate::error::AppError;
use sqlx::PgPool;

/// Audit columns carried by every entity table.
const AUDIT_COLUMNS: &str = r#"
    version INTEGER NOT NULL DEFAULT 1,
    deleted BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ,
    updated_by UUID
"#;

fn tables() -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                cod INTEGER NOT NULL DEFAULT 0,
                password_hash BYTEA NOT NULL,
                activated BOOLEAN NOT NULL DEFAULT false,
                {AUDIT_COLUMNS}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS day_logs (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES users (id),
                date DATE NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                mood_label INTEGER NOT NULL CHECK (mood_label BETWEEN 1 AND 3),
                {AUDIT_COLUMNS}
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name TEXT NOT NULL,
                user_id UUID NOT NULL REFERENCES users (id),
                {AUDIT_COLUMNS}
            )
            "#
        ),
        r#"
        CREATE TABLE IF NOT EXISTS log_tags (
            log_id UUID NOT NULL REFERENCES day_logs (id),
            tag_id UUID NOT NULL REFERENCES tags (id),
            PRIMARY KEY (log_id, tag_id)
        )
        "#
        .to_string(),
    ]
}

const INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (lower(email)) WHERE deleted = false",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_phone_key ON users (phone) WHERE deleted = false",
    "CREATE UNIQUE INDEX IF NOT EXISTS tags_user_name_key ON tags (user_id, lower(name)) WHERE deleted = false",
    "CREATE INDEX IF NOT EXISTS day_logs_user_date_idx ON day_logs (user_id, date) WHERE deleted = false",
    "CREATE INDEX IF NOT EXISTS log_tags_tag_idx ON log_tags (tag_id)",
];

const VIEW: &str = r#"
CREATE OR REPLACE VIEW day_logs_with_tags AS
SELECT
    d.id,
    d.user_id,
    d.date,
    d.description,
    d.mood_label,
    ARRAY(
        SELECT t.name
        FROM log_tags lt
        JOIN tags t ON t.id = lt.tag_id
        WHERE lt.log_id = d.id AND t.deleted = false
        ORDER BY t.name
    ) AS tags,
    d.version,
    d.deleted,
    d.created_at,
    d.created_by,
    d.updated_at,
    d.updated_by
FROM day_logs d
"#;

/// Create or update the schema.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for ddl in tables() {
        sqlx::query(&ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    sqlx::query(VIEW).execute(pool).await?;
    tracing::info!(tables = 4, indexes = INDEXES.len(), "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for ddl in tables() {
            assert!(ddl.contains("IF NOT EXISTS"), "{ddl}");
        }
        for ddl in INDEXES {
            assert!(ddl.contains("IF NOT EXISTS"), "{ddl}");
        }
        assert!(VIEW.contains("CREATE OR REPLACE VIEW"));
    }

    #[test]
    fn unique_indexes_match_constraint_translation() {
        for name in ["users_email_key", "users_phone_key", "tags_user_name_key"] {
            assert!(INDEXES.iter().any(|ddl| ddl.contains(name)), "{name}");
        }
    }
}
