use super::Validator;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::repository::{run_in_transaction, UserRepository};
use rand::Rng;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserService {
    pool: PgPool,
    timeout: Duration,
    users: UserRepository,
}

/// Six-digit activation code.
fn activation_code() -> i32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

impl UserService {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        UserService {
            pool,
            timeout,
            users: UserRepository::new(timeout),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.users.get_by_id(&self.pool, id).await
    }

    /// The caller identified upstream, provided the account exists and is active.
    pub async fn authenticate(&self, id: Uuid) -> Result<User, AppError> {
        let user = match self.get(id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized("unknown user".into())),
            Err(e) => return Err(e),
        };
        if !user.is_active() {
            return Err(AppError::Unauthorized("user account is not activated".into()));
        }
        Ok(user)
    }

    /// Create an inactive account with a fresh activation code.
    pub async fn register(&self, input: NewUser) -> Result<User, AppError> {
        let mut user = User {
            name: input.name,
            email: input.email,
            phone: input.phone,
            password_hash: input.password_hash,
            cod: activation_code(),
            ..User::default()
        };
        let mut v = Validator::new();
        user.validate(&mut v);
        v.finish()?;

        let users = self.users.clone();
        let user = run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                users.insert(&mut **tx, &mut user).await?;
                Ok(user)
            })
        })
        .await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Activate the account matching `email` and its pending `code`.
    pub async fn activate(&self, email: &str, code: i32) -> Result<User, AppError> {
        let mut v = Validator::new();
        crate::models::validate_email(&mut v, email);
        v.finish()?;

        let mut user = match self.users.get_by_cod_and_email(&self.pool, code, email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::invalid("code", "invalid validation code or email"));
            }
            Err(e) => return Err(e),
        };
        user.activated = true;
        user.cod = 0;

        let users = self.users.clone();
        let user = run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move {
                users.update(&mut **tx, &mut user).await?;
                Ok(user)
            })
        })
        .await?;
        tracing::info!(user_id = %user.id, "user activated");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let users = self.users.clone();
        run_in_transaction(&self.pool, self.timeout, move |tx| {
            Box::pin(async move { users.delete(&mut **tx, id).await })
        })
        .await
    }
}
