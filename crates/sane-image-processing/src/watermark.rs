use std::path::{Path, PathBuf};

use sane_image_core::models::{CanvasPad, FitMode, Gravity, Rgba, WatermarkPlan};
use sane_image_core::WatermarkConfig;

use crate::traits::AssetDimensions;

/// Sizes the watermark relative to the rendered base image.
///
/// The overlay width is `round(width * percent / 100)`, raised to `min_width` and then
/// capped at the base width, so small images get a legible mark that still fits.
#[derive(Debug, Clone)]
pub struct WatermarkCompositor {
    source: PathBuf,
    percent: f64,
    min_width: u32,
    gravity: Gravity,
    normalize_canvas: bool,
}

impl WatermarkCompositor {
    pub fn new(config: &WatermarkConfig) -> Self {
        Self {
            source: config.path.clone(),
            percent: config.percent,
            min_width: config.min_width,
            gravity: config.gravity,
            normalize_canvas: config.normalize_canvas,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn overlay_width(&self, image_width: u32) -> u32 {
        let candidate = (image_width as f64 * self.percent / 100.0).round() as u32;
        candidate.max(self.min_width).min(image_width)
    }

    /// Overlay height for `overlay_width`: proportional to the watermark's own aspect
    /// ratio when known, never taller than the base.
    fn overlay_height(
        &self,
        overlay_width: u32,
        image_height: u32,
        source: Option<AssetDimensions>,
    ) -> u32 {
        match source {
            Some(AssetDimensions { width, height }) if width > 0 && height > 0 => {
                let proportional =
                    (overlay_width as f64 * height as f64 / width as f64).round() as u32;
                proportional.clamp(1, image_height)
            }
            _ => image_height,
        }
    }

    /// Plan the watermark pass for a base render of `image_width` x `image_height`.
    /// Returns `None` for an empty base.
    pub fn plan(
        &self,
        image_width: u32,
        image_height: u32,
        source: Option<AssetDimensions>,
    ) -> Option<WatermarkPlan> {
        if image_width == 0 || image_height == 0 {
            return None;
        }

        let overlay_width = self.overlay_width(image_width);
        let overlay_height = self.overlay_height(overlay_width, image_height, source);

        let canvas = self.normalize_canvas.then_some(CanvasPad {
            width: image_width,
            height: image_height,
            fit: FitMode::Contain,
            background: Rgba::TRANSPARENT,
        });

        Some(WatermarkPlan {
            overlay_source: self.source.clone(),
            overlay_width,
            overlay_height,
            gravity: self.gravity,
            canvas,
        })
    }
}
