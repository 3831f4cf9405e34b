//! Logger error types.

use thiserror::Error;

/// Logger construction errors.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Level directive rejected by `EnvFilter`
    #[error("Invalid log level '{level}': {reason}")]
    InvalidLevel { level: String, reason: String },
}

/// Result type for logger operations.
pub type Result<T> = std::result::Result<T, LoggerError>;
