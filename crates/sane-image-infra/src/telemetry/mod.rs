//! Tracing initialization
//!
//! The optimizer runs inside a host process; hosts that already install a global
//! subscriber skip this and the optimizer's spans flow into theirs.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, TelemetryConfig};
