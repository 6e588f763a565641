use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("invalid page: {0}")]
    InvalidPage(String),
}
