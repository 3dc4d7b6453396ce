//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated builder preconditions.
/// Looking up an id that does not exist is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("record has no id field: {key}")]
    MissingId { key: String },

    #[error("record id field {key} is neither an integer nor a string: {found}")]
    InvalidId { key: String, found: String },

    #[error("record has no title field: {key}")]
    MissingTitle { key: String },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
