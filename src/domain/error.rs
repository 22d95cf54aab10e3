//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::RowId;

/// Domain errors represent violations of the allocation tree's rules.
/// They never leave a forest snapshot half-updated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("row id is not unique in the table: {0}")]
    ConflictingIdentifier(RowId),

    #[error("division by zero: row {0} has a base value of 0")]
    DivisionByZero(RowId),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid table document: {0}")]
    InvalidDocument(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
