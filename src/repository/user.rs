use super::{execute, find_one, get_one, prepare, Inserted, Updated};
use crate::error::{translate_unique, AppError};
use crate::mapper::select_columns;
use crate::models::User;
use crate::sql::Params;
use sqlx::{Executor, Postgres};
use std::time::Duration;
use uuid::Uuid;

const UNIQUE: &[(&str, &str)] = &[("users_email_key", "email"), ("users_phone_key", "phone")];

#[derive(Debug, Clone)]
pub struct UserRepository {
    timeout: Duration,
}

impl UserRepository {
    pub fn new(timeout: Duration) -> Self {
        UserRepository { timeout }
    }

    pub async fn get_by_id<'c, X>(&self, db: X, id: Uuid) -> Result<User, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM users u WHERE u.id = :id AND u.deleted = false",
            select_columns::<User>("u")
        );
        let q = prepare(&sql, &Params::new().set("id", id))?;
        get_one(db, &q, self.timeout).await
    }

    pub async fn get_by_cod_and_email<'c, X>(&self, db: X, cod: i32, email: &str) -> Result<User, AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}
            FROM users u
            WHERE
                lower(u.email) = lower(:email)
                AND u.cod = :cod
                AND u.cod <> 0
                AND u.deleted = false
            "#,
            select_columns::<User>("u")
        );
        let q = prepare(&sql, &Params::new().set("email", email).set("cod", cod))?;
        get_one(db, &q, self.timeout).await
    }

    /// Insert and fill in the generated id, version and creation time.
    pub async fn insert<'c, X>(&self, db: X, user: &mut User) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let params = Params::new()
            .set("name", user.name.as_str())
            .set("email", user.email.as_str())
            .set("phone", user.phone.as_str())
            .set("cod", user.cod)
            .set("password_hash", user.password_hash.clone())
            .set("activated", user.activated);
        let q = prepare(
            r#"
            INSERT INTO users (name, email, phone, cod, password_hash, activated)
            VALUES (:name, :email, :phone, :cod, :password_hash, :activated)
            RETURNING id, version, created_at
            "#,
            &params,
        )?;
        let row: Inserted = get_one(db, &q, self.timeout)
            .await
            .map_err(|e| translate_unique(e, UNIQUE))?;
        user.id = row.id;
        user.base.version = row.version;
        user.base.created_at = row.created_at;
        Ok(())
    }

    /// Versioned update; a stale `version` is an edit conflict.
    pub async fn update<'c, X>(&self, db: X, user: &mut User) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let params = Params::new()
            .set("id", user.id)
            .set("version", user.base.version)
            .set("name", user.name.as_str())
            .set("email", user.email.as_str())
            .set("phone", user.phone.as_str())
            .set("cod", user.cod)
            .set("password_hash", user.password_hash.clone())
            .set("activated", user.activated);
        let q = prepare(
            r#"
            UPDATE users SET
                name = :name,
                email = :email,
                phone = :phone,
                cod = :cod,
                password_hash = :password_hash,
                activated = :activated,
                updated_at = NOW(),
                updated_by = :id,
                version = version + 1
            WHERE
                id = :id
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
        user.base.version = row.version;
        user.base.updated_at = row.updated_at;
        Ok(())
    }

    pub async fn delete<'c, X>(&self, db: X, id: Uuid) -> Result<(), AppError>
    where
        X: Executor<'c, Database = Postgres>,
    {
        let q = prepare(
            "UPDATE users SET deleted = true, updated_at = NOW() WHERE id = :id AND deleted = false",
            &Params::new().set("id", id),
        )?;
        match execute(db, &q, self.timeout).await? {
            0 => Err(AppError::NotFound("user".into())),
            _ => Ok(()),
        }
    }
}
