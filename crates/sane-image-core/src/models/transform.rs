//! Transformation plans handed to the asset renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Output codec of the optimization render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Avif,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Avif => "avif",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Avif => "image/avif",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resize policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Shrink to fit inside the box, preserving aspect ratio, never cropping.
    Inside,
    /// Fit inside the box and pad the remainder with the background colour.
    Contain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnlargementPolicy {
    Allow,
    Disallow,
}

/// Ancillary encoder steps applied after the resize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformStep {
    /// Keep the source metadata (orientation, colour profile) in the output.
    WithMetadata,
    Avif { quality: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationPlan {
    pub output_format: OutputFormat,
    pub quality: u8,
    pub max_width: u32,
    pub max_height: u32,
    pub fit: FitMode,
    pub enlargement: EnlargementPolicy,
    pub steps: Vec<TransformStep>,
}

impl TransformationPlan {
    /// Dimensions a `width` x `height` source ends up with under this plan.
    pub fn fitted_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        let scale_w = self.max_width as f64 / width as f64;
        let scale_h = self.max_height as f64 / height as f64;
        let mut scale = scale_w.min(scale_h);
        if self.enlargement == EnlargementPolicy::Disallow {
            scale = scale.min(1.0);
        }
        let fitted_w = ((width as f64 * scale).round() as u32).max(1);
        let fitted_h = ((height as f64 * scale).round() as u32).max(1);
        (fitted_w, fitted_h)
    }
}

/// Anchor used when compositing the watermark onto the base image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    #[default]
    Center,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        alpha: 0.0,
    };
}

/// Letterbox step: resize the base to exactly `width` x `height` with `fit: contain`
/// over `background`. With the base's own dimensions this only normalizes the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasPad {
    pub width: u32,
    pub height: u32,
    pub fit: FitMode,
    pub background: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkPlan {
    pub overlay_source: PathBuf,
    /// Bounding box for the overlay; the overlay keeps its own aspect ratio inside it.
    pub overlay_width: u32,
    pub overlay_height: u32,
    pub gravity: Gravity,
    pub canvas: Option<CanvasPad>,
}

/// Render stage, used for logging and rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    Optimize,
    Watermark,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStage::Optimize => write!(f, "optimize"),
            RenderStage::Watermark => write!(f, "watermark"),
        }
    }
}

/// Everything the renderer can be asked to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetTransform {
    Optimize(TransformationPlan),
    Watermark(WatermarkPlan),
}

impl AssetTransform {
    pub fn stage(&self) -> RenderStage {
        match self {
            AssetTransform::Optimize(_) => RenderStage::Optimize,
            AssetTransform::Watermark(_) => RenderStage::Watermark,
        }
    }
}
