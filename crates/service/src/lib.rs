//! `service` crate — the sequence service.
//!
//! A thin layer over [`db::SequenceStore`]: every call is forwarded as-is and
//! failures are wrapped with an operation description. The error kind
//! (not-found vs storage) is never changed.

pub mod error;
pub mod sequences;

pub use error::{ErrorKind, ServiceError};
pub use sequences::SequenceService;
