//! Queue item handler trait
//!
//! The orchestrator implements this trait for its per-file pipeline. The queue calls
//! `handle` for one item at a time, in arrival order.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use sane_image_core::models::{ProcessOutcome, QueueItem};

#[async_trait]
pub trait QueueItemHandler: Send + Sync {
    /// Run the full processing attempt for one item.
    async fn handle(self: Arc<Self>, item: QueueItem) -> Result<ProcessOutcome>;
}
