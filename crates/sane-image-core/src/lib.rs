//! Sane Image Core Library
//!
//! Domain models, configuration, error types and the host hook interface shared by
//! all sane-image crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod hooks;
pub mod models;
pub mod stream;

// Re-export commonly used types
pub use config::{OptimizerConfig, RenderLimitConfig, WatermarkConfig};
pub use error::{ConfigError, LogLevel, OptimizerError};
pub use hooks::{FileUploadHook, HookDisposition, IgnoreReason};
pub use stream::ByteStream;
