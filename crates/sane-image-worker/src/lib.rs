//! Sane Image Worker Library
//!
//! Explicit, constructible processing queue: uploads are handled strictly one at a
//! time in arrival order, and every item is attempted exactly once.

pub mod context;
pub mod queue;

pub use context::QueueItemHandler;
pub use queue::{OptimizationQueue, QueueConfig, QueueStats};
