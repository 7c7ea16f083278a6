//! Crate-wide error types.

use thiserror::Error;

/// Errors raised by collection and network operations.
///
/// Malformed records are never reported through this enum; they ride the
/// `bad` flag on [`Record`](crate::models::Record) and the error map on
/// [`RecordCollection`](crate::RecordCollection) so a single bad record
/// cannot abort processing of a whole collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A value had the wrong shape for the requested operation, e.g. a
    /// record without a numeric year passed to a year-range split.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An enumerated option was not recognized, e.g. an unknown node mode
    /// or statistics key name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A record looked up by value or identity was absent.
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
