//! Error types for the solo CLI.
//!
//! Uses thiserror for derive macros. Every error is terminal: the first
//! failure at any stage short-circuits to the release-and-exit path, and
//! nothing is retried.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for solo operations.
///
/// Each variant maps to an exit code: usage-class failures exit 1, while
/// OS-level failures propagate the raw errno of the underlying operation.
#[derive(Error, Debug)]
pub enum SoloError {
    /// Bad arguments (missing command, malformed flags).
    #[error("{0}")]
    Usage(String),

    /// No usable lock directory, or a directory probe failed outright.
    #[error("cannot find a lock directory: {0}")]
    Resolution(String),

    /// The wrapped command's basename is empty.
    #[error("invalid command name '{0}'")]
    InvalidCommandName(String),

    /// The derived lock path would exceed the platform path limit.
    #[error("derived lock path exceeds the platform path limit ({0} bytes)")]
    PathTooLong(usize),

    /// Creating the lock file failed.
    #[error("lock file creation failed: {source}")]
    LockCreation { source: std::io::Error },

    /// The lock is held by another process.
    #[error("another instance is already running")]
    LockContention { source: std::io::Error },

    /// Taking the lock failed for a reason other than contention.
    #[error("cannot take lock: {source}")]
    LockAcquisition { source: std::io::Error },

    /// Installing a signal handler failed.
    #[error("failed to install signal handler: {source}")]
    SignalInstall { source: std::io::Error },

    /// Spawning the wrapped command failed (fork or image replacement).
    #[error("failed to run command: {source}")]
    Spawn { source: std::io::Error },

    /// Waiting for the wrapped command failed.
    #[error("failed to wait for command: {source}")]
    Wait { source: std::io::Error },
}

impl SoloError {
    /// Returns the appropriate exit code for this error.
    ///
    /// OS-backed failures exit with the raw errno when one is available,
    /// falling back to the usage-error code when the OS gives none.
    pub fn exit_code(&self) -> i32 {
        match self {
            SoloError::Usage(_)
            | SoloError::Resolution(_)
            | SoloError::InvalidCommandName(_)
            | SoloError::PathTooLong(_) => exit_codes::USAGE_ERROR,
            SoloError::LockCreation { source }
            | SoloError::LockContention { source }
            | SoloError::LockAcquisition { source }
            | SoloError::SignalInstall { source }
            | SoloError::Spawn { source }
            | SoloError::Wait { source } => {
                source.raw_os_error().unwrap_or(exit_codes::USAGE_ERROR)
            }
        }
    }
}

/// Result type alias for solo operations.
pub type Result<T> = std::result::Result<T, SoloError>;
