//! Atomic multi-statement writes.

use super::executor::with_timeout;
use crate::error::AppError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

/// Something that can open a transaction.
#[async_trait]
pub trait TransactionSource: Sync {
    type Tx: TransactionHandle;

    async fn begin_tx(&self) -> Result<Self::Tx, sqlx::Error>;
}

/// An open transaction; consumed by commit or rollback.
#[async_trait]
pub trait TransactionHandle: Send {
    async fn commit_tx(self) -> Result<(), sqlx::Error>;
    async fn rollback_tx(self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl TransactionSource for PgPool {
    type Tx = Transaction<'static, Postgres>;

    async fn begin_tx(&self) -> Result<Self::Tx, sqlx::Error> {
        self.begin().await
    }
}

#[async_trait]
impl TransactionHandle for Transaction<'static, Postgres> {
    async fn commit_tx(self) -> Result<(), sqlx::Error> {
        self.commit().await
    }

    async fn rollback_tx(self) -> Result<(), sqlx::Error> {
        self.rollback().await
    }
}

/// Run `work` inside one transaction.
///
/// `Ok` commits and returns the value, or the commit error. `Err` rolls back
/// and returns the work's error; if the rollback fails as well, both errors
/// come back as `RollbackFailed`. `timeout` bounds begin, commit and
/// rollback; statements inside `work` carry their own.
pub async fn run_in_transaction<S, F, R>(source: &S, timeout: Duration, work: F) -> Result<R, AppError>
where
    S: TransactionSource,
    F: for<'t> FnOnce(&'t mut S::Tx) -> BoxFuture<'t, Result<R, AppError>> + Send,
    R: Send,
{
    let mut tx = with_timeout(timeout, source.begin_tx()).await?;
    let outcome = work(&mut tx).await;
    match outcome {
        Ok(value) => {
            with_timeout(timeout, tx.commit_tx()).await?;
            Ok(value)
        }
        Err(err) => match with_timeout(timeout, tx.rollback_tx()).await {
            Ok(()) => Err(err),
            Err(rollback) => Err(AppError::RollbackFailed {
                source: Box::new(err),
                rollback,
            }),
        },
    }
}
