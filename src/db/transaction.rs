//! Unit-of-work helper for multi-statement writes.

use crate::db::connection::DbPool;
use crate::error::PollError;
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

/// Runs `work` inside one transaction on a pooled connection.
///
/// The transaction starts with `BEGIN IMMEDIATE`, taking the write lock up front so a
/// concurrent writer waits out the busy timeout instead of failing its lock upgrade
/// after a read. Commits when `work` returns `Ok`. On `Err` the transaction is rolled back and the
/// original error is returned; a failed rollback is logged but never replaces it.
/// If the future is dropped midway, the transaction guard rolls back on drop. The
/// connection goes back to the pool on every path.
pub async fn in_transaction<T, F>(pool: &DbPool, work: F) -> Result<T, PollError>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, PollError>>,
{
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let result = work(&mut *tx).await;

    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("rollback failed after `{}`: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
