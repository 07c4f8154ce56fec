//! Service-level error type.

use db::DbError;
use thiserror::Error;

/// Coarse classification of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed row does not exist for this account.
    NotFound,
    /// Connection, constraint, commit or rollback failure.
    Storage,
}

/// A store failure annotated with the operation that hit it.
#[derive(Debug, Error)]
#[error("{operation}: {source}")]
pub struct ServiceError {
    operation: &'static str,
    #[source]
    source: DbError,
}

impl ServiceError {
    pub(crate) fn new(operation: &'static str, source: DbError) -> Self {
        Self { operation, source }
    }

    /// e.g. "failed to add sequence".
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn kind(&self) -> ErrorKind {
        if self.source.is_not_found() {
            ErrorKind::NotFound
        } else {
            ErrorKind::Storage
        }
    }

    pub fn source_error(&self) -> &DbError {
        &self.source
    }
}
