//! Errors raised by the sequence store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Pool, connection or statement failure, including a failed commit.
    #[error("sequence store query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// An update, delete or read matched no row for the account-scoped key.
    #[error("row not found")]
    NotFound,

    /// The embedded `sequences`/`steps` migrations could not be applied.
    #[error("applying sequence migrations failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// True when the key did not match, as opposed to a storage fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
