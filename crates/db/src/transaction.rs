//! Scoped transactions for the store's write paths.
//!
//! A [`ScopedTx`] is opened per store call and always released: `finish`
//! commits an `Ok` result and rolls back an `Err`. If the owning future is
//! dropped before `finish` (for example because the HTTP client went away),
//! the inner `sqlx::Transaction` rolls back on drop.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use crate::DbError;

pub(crate) struct ScopedTx {
    tx: Transaction<'static, Postgres>,
    operation: &'static str,
}

impl ScopedTx {
    pub(crate) async fn begin(pool: &PgPool, operation: &'static str) -> Result<Self, DbError> {
        let tx = pool.begin().await?;
        debug!(operation, "transaction opened");
        Ok(Self { tx, operation })
    }

    /// Connection bound to this transaction.
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit on success, roll back on failure.
    ///
    /// A commit failure is returned as the operation's error. A rollback
    /// failure is logged and the original error is returned.
    pub(crate) async fn finish<T>(self, result: Result<T, DbError>) -> Result<T, DbError> {
        let Self { tx, operation } = self;
        match result {
            Ok(value) => {
                tx.commit().await?;
                debug!(operation, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                match tx.rollback().await {
                    Ok(()) => debug!(operation, error = %err, "transaction rolled back"),
                    Err(rollback_err) => warn!(
                        operation,
                        error = %err,
                        rollback_error = %rollback_err,
                        "transaction rollback failed"
                    ),
                }
                Err(err)
            }
        }
    }
}
