//! Transformation planning: which uploads get re-encoded, and how.

use sane_image_core::constants::SUPPORTED_SUBTYPES;
use sane_image_core::models::{
    media_subtype, EnlargementPolicy, FitMode, OutputFormat, TransformStep, TransformationPlan,
};
use sane_image_core::OptimizerConfig;

#[derive(Debug, Clone)]
pub struct TransformationPlanner {
    quality: u8,
    max_dimension: u32,
}

impl TransformationPlanner {
    pub fn new(quality: u8, max_dimension: u32) -> Self {
        Self {
            quality,
            max_dimension,
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.quality, config.max_dimension)
    }

    /// Plan the AVIF re-encode for `media_type`, or `None` when the type is not eligible.
    pub fn plan(&self, media_type: &str) -> Option<TransformationPlan> {
        if !is_eligible(media_type) {
            return None;
        }

        Some(TransformationPlan {
            output_format: OutputFormat::Avif,
            quality: self.quality,
            max_width: self.max_dimension,
            max_height: self.max_dimension,
            fit: FitMode::Inside,
            enlargement: EnlargementPolicy::Disallow,
            steps: vec![
                TransformStep::WithMetadata,
                TransformStep::Avif {
                    quality: self.quality,
                },
            ],
        })
    }
}

/// Only the subtype is checked, and it must match exactly: `application/png` is as
/// eligible as `image/png`, `image/PNG` is not.
pub fn is_eligible(media_type: &str) -> bool {
    media_subtype(media_type)
        .map(|subtype| SUPPORTED_SUBTYPES.iter().any(|s| *s == subtype))
        .unwrap_or(false)
}
