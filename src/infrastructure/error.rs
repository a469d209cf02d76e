//! Container-level errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by container backends while creating or reading groups.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("group already exists: {0}")]
    GroupExists(String),

    #[error("invalid group name: {0:?}")]
    InvalidName(String),

    #[error("not an EMD container: {0}")]
    NotAContainer(PathBuf),

    #[error("invalid group manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },
}

impl ContainerError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
