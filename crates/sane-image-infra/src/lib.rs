//! Sane Image Infrastructure Library
//!
//! Tracing setup and the rate limiter placed in front of the asset renderer.

#[cfg(feature = "rate-limit")]
pub mod rate_limit;
pub mod telemetry;

#[cfg(feature = "rate-limit")]
pub use rate_limit::RateLimiter;
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
