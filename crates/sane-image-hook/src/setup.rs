//! Wiring for the optimizer: pipeline, queue and hook built from one config.

use std::sync::Arc;

use sane_image_core::OptimizerConfig;
use sane_image_infra::RateLimiter;
use sane_image_processing::AssetRenderer;
use sane_image_storage::FileStore;
use sane_image_worker::{OptimizationQueue, QueueConfig, QueueStats};

use crate::hook::ImageOptimizerHook;
use crate::pipeline::OptimizationPipeline;
use crate::throttle::ThrottledRenderer;

/// A registered optimizer instance.
///
/// Holds the queue explicitly; independent instances never share state.
pub struct ImageOptimizer {
    hook: Arc<ImageOptimizerHook>,
    queue: OptimizationQueue,
}

impl ImageOptimizer {
    pub fn new(
        config: &OptimizerConfig,
        renderer: Arc<dyn AssetRenderer>,
        store: Arc<dyn FileStore>,
    ) -> Self {
        let renderer: Arc<dyn AssetRenderer> = match RateLimiter::from_config(&config.render_limit)
        {
            Some(limiter) => {
                tracing::info!(
                    rate_per_sec = config.render_limit.rate_per_sec,
                    burst = config.render_limit.burst,
                    "Render rate limiting enabled"
                );
                Arc::new(ThrottledRenderer::new(renderer, limiter))
            }
            None => renderer,
        };

        let pipeline = Arc::new(OptimizationPipeline::new(config, renderer, store));
        let queue = OptimizationQueue::new(pipeline, QueueConfig::from_config(config));
        let hook = Arc::new(ImageOptimizerHook::new(queue.clone()));

        tracing::info!(
            max_dimension = config.max_dimension,
            quality = config.quality,
            watermark = %config.watermark.path.display(),
            suppress_notifications = config.suppress_notifications,
            "Image optimizer registered"
        );

        Self { hook, queue }
    }

    pub fn hook(&self) -> Arc<ImageOptimizerHook> {
        self.hook.clone()
    }

    pub fn queue(&self) -> &OptimizationQueue {
        &self.queue
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Stop accepting uploads and wait for queued ones to finish.
    pub async fn shutdown(&self) {
        self.queue.close();
        self.queue.wait_idle().await;
        let stats = self.queue.stats();
        tracing::info!(
            optimized = stats.optimized,
            skipped = stats.skipped,
            failed = stats.failed,
            "Image optimizer stopped"
        );
    }
}
