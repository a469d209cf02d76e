//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::ContainerError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        CliError::Application(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Container(c) => match c {
                    ContainerError::NotAContainer(_) => crate::exitcode::NOINPUT,
                    ContainerError::Io { .. } => crate::exitcode::IOERR,
                    ContainerError::GroupExists(_) | ContainerError::InvalidName(_) => {
                        crate::exitcode::CANTCREAT
                    }
                    ContainerError::Manifest { .. } => crate::exitcode::DATAERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn given_domain_error_when_mapped_then_dataerr() {
        let err = CliError::from(DomainError::KeyNotFound("x".into()));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_container_when_mapped_then_noinput() {
        let err = CliError::from(ContainerError::NotAContainer(PathBuf::from("/nope")));
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }
}
