//! Error types for the table-operations core.

use thiserror::Error;

/// Main error type for generic table operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The logical table name is not in the registry.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,

    /// The request shape is invalid (missing or unknown fields).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No predicate could be built for the search term.
    #[error("no searchable columns found")]
    NoSearchableColumns,

    /// Underlying store failure.
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Convenience alias used throughout the core crate.
pub type CoreResult<T> = Result<T, CoreError>;
