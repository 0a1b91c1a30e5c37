//! Asset renderer capability
//!
//! The renderer executes transformation plans against stored files. Pixel work
//! (resize, composite, encode) happens behind this trait.

use async_trait::async_trait;
use sane_image_core::models::{AssetTransform, FileKey};
use sane_image_core::ByteStream;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Render failed: {0}")]
    Failed(String),

    #[error("Unsupported transform: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderOutcome<T> = Result<T, RenderError>;

/// Rendered bytes plus the metadata of the result.
pub struct RenderResult {
    pub stream: ByteStream,
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

impl std::fmt::Debug for RenderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderResult")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetDimensions {
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait AssetRenderer: Send + Sync {
    /// Render `transform` for the file at `file_key`.
    ///
    /// With `input` set, the transform applies to that stream instead of the stored
    /// original. The stream is consumed either way.
    async fn render(
        &self,
        file_key: &FileKey,
        transform: &AssetTransform,
        input: Option<ByteStream>,
    ) -> RenderOutcome<RenderResult>;

    /// Dimensions of an auxiliary asset on disk (e.g. the watermark).
    async fn get_metadata(&self, asset_path: &Path) -> RenderOutcome<AssetDimensions>;
}
