//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree invariants.
/// These are independent of container and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node is not rooted: {0}")]
    Unrooted(String),

    #[error("node is already rooted: {0}; use graft to move it between trees")]
    AlreadyRooted(String),

    #[error("{0} not found in tree - check keys")]
    KeyNotFound(String),

    #[error("invalid tree path: {0:?}")]
    InvalidPath(String),

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid EMD group type: {0}")]
    InvalidGroupType(String),
}

impl DomainError {
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
