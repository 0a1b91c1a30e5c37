//! Per-file optimization pipeline.
//!
//! plan -> AVIF render -> size check -> watermark render -> record rewrite -> store.
//! A render that is not strictly smaller than the original leaves the file untouched.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sane_image_core::models::{AssetTransform, ProcessOutcome, QueueItem, SkipReason};
use sane_image_core::{OptimizerConfig, OptimizerError};
use sane_image_processing::{AssetRenderer, TransformationPlanner, WatermarkCompositor};
use sane_image_storage::{FileStore, StoreOptions};
use sane_image_worker::QueueItemHandler;

use crate::metadata::rewrite_payload;

pub struct OptimizationPipeline {
    renderer: Arc<dyn AssetRenderer>,
    store: Arc<dyn FileStore>,
    planner: TransformationPlanner,
    compositor: WatermarkCompositor,
    suppress_notifications: bool,
}

impl OptimizationPipeline {
    pub fn new(
        config: &OptimizerConfig,
        renderer: Arc<dyn AssetRenderer>,
        store: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            renderer,
            store,
            planner: TransformationPlanner::from_config(config),
            compositor: WatermarkCompositor::new(&config.watermark),
            suppress_notifications: config.suppress_notifications,
        }
    }

    #[tracing::instrument(skip(self, item), fields(file_key = %item.file_key, media_type = tracing::field::Empty))]
    pub async fn process(&self, item: QueueItem) -> Result<ProcessOutcome> {
        let QueueItem {
            file_key,
            mut payload,
            context,
            ..
        } = item;

        let media_type = payload.media_type.clone();
        if let Some(media_type) = media_type.as_deref() {
            tracing::Span::current().record("media_type", media_type);
        }

        let Some(plan) = media_type.as_deref().and_then(|t| self.planner.plan(t)) else {
            tracing::debug!(file_key = %file_key, "Media type not eligible for AVIF conversion");
            return Ok(ProcessOutcome::Skipped(SkipReason::UnsupportedMediaType {
                media_type,
            }));
        };
        let output_format = plan.output_format;

        let base = self
            .renderer
            .render(&file_key, &AssetTransform::Optimize(plan), None)
            .await
            .with_context(|| format!("AVIF render failed for {}", file_key))?;

        let original_size = payload.filesize;
        if base.size >= original_size {
            tracing::info!(
                file_key = %file_key,
                original_size,
                rendered_size = base.size,
                "AVIF conversion skipped: new file size not smaller"
            );
            drop(base.stream);
            return Ok(ProcessOutcome::Skipped(SkipReason::NotSmaller {
                original_size,
                rendered_size: base.size,
            }));
        }

        let watermark_dimensions = match self.renderer.get_metadata(self.compositor.source()).await
        {
            Ok(dimensions) => Some(dimensions),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.compositor.source().display(),
                    "Could not read watermark dimensions, sizing by width only"
                );
                None
            }
        };

        let watermark_plan = self
            .compositor
            .plan(base.width, base.height, watermark_dimensions)
            .ok_or_else(|| OptimizerError::InvalidRender {
                file_key: file_key.clone(),
                reason: format!("base render has no area ({}x{})", base.width, base.height),
            })?;

        tracing::debug!(
            file_key = %file_key,
            rendered_size = base.size,
            overlay_width = watermark_plan.overlay_width,
            "Applying watermark"
        );

        let watermarked = self
            .renderer
            .render(
                &file_key,
                &AssetTransform::Watermark(watermark_plan),
                Some(base.stream),
            )
            .await
            .with_context(|| format!("Watermark render failed for {}", file_key))?;

        let (width, height, final_size) =
            (watermarked.width, watermarked.height, watermarked.size);
        rewrite_payload(&mut payload, output_format, width, height, final_size);

        self.store
            .store(
                watermarked.stream,
                &payload,
                &file_key,
                &context,
                StoreOptions {
                    suppress_notification: self.suppress_notifications,
                },
            )
            .await
            .with_context(|| format!("Failed to store optimized file {}", file_key))?;

        tracing::info!(
            file_key = %file_key,
            original_size,
            final_size,
            width,
            height,
            "File successfully converted to AVIF with fitted watermark"
        );

        Ok(ProcessOutcome::Optimized {
            file_key,
            original_size,
            final_size,
            width,
            height,
        })
    }
}

#[async_trait]
impl QueueItemHandler for OptimizationPipeline {
    async fn handle(self: Arc<Self>, item: QueueItem) -> Result<ProcessOutcome> {
        self.process(item).await
    }
}
