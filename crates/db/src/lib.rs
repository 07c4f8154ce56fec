//! `db` crate — the sequence store.
//!
//! Provides a connection pool, typed row structs, scoped transactions and the
//! SQL for the `sequences` and `steps` tables.  No business logic lives here.

pub mod error;
pub mod mock;
pub mod models;
pub mod pool;
pub mod repository;
pub mod store;
mod transaction;

pub use error::DbError;
pub use mock::MockSequenceStore;
pub use pool::DbPool;
pub use store::{PgSequenceStore, SequenceStore};
