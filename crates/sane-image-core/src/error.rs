//! Error types module
//!
//! Configuration errors and the classification of per-file pipeline failures.
//! Renderer and store failures have their own error types in the processing and
//! storage crates; orchestration code wraps them with `anyhow` context.

use std::time::Duration;

use crate::models::FileKey;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Processing queue is closed")]
    QueueClosed,

    #[error("No Tokio runtime available to process the queue")]
    NoRuntime,

    #[error("Processing of {file_key} timed out after {after:?}")]
    Timeout { file_key: FileKey, after: Duration },

    #[error("Processing task for {file_key} aborted: {reason}")]
    Aborted { file_key: FileKey, reason: String },

    #[error("Invalid render output for {file_key}: {reason}")]
    InvalidRender { file_key: FileKey, reason: String },
}

impl OptimizerError {
    pub fn log_level(&self) -> LogLevel {
        match self {
            OptimizerError::QueueClosed => LogLevel::Warn,
            OptimizerError::NoRuntime => LogLevel::Error,
            OptimizerError::Timeout { .. } => LogLevel::Warn,
            OptimizerError::Aborted { .. } => LogLevel::Error,
            OptimizerError::InvalidRender { .. } => LogLevel::Error,
        }
    }
}
