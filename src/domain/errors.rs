//! Error types for the logging facility.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or attaching log destinations
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A level string that is not a known level
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// The configured file name is empty
    #[error("Log file name cannot be empty")]
    EmptyFileName,

    /// The active log file could not be opened
    #[error("Failed to open log file {path}: {source}")]
    OpenFailed {
        /// File that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Moving the active file to its backups failed
    #[error("Failed to rotate log file {path}: {source}")]
    RotationFailed {
        /// Active file being rotated
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;
