//! Repository functions — one function per database statement.
//!
//! Every function takes a Postgres executor and returns a `Result<T, DbError>`.
//! Transactions are opened by the store, never here.

pub mod sequences;
