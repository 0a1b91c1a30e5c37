//! Renderer decorator that spaces out calls to a shared rendering backend.

use async_trait::async_trait;
use sane_image_core::models::{AssetTransform, FileKey};
use sane_image_core::ByteStream;
use sane_image_infra::RateLimiter;
use sane_image_processing::{AssetDimensions, AssetRenderer, RenderOutcome, RenderResult};
use std::path::Path;
use std::sync::Arc;

pub struct ThrottledRenderer {
    inner: Arc<dyn AssetRenderer>,
    limiter: RateLimiter,
}

impl ThrottledRenderer {
    pub fn new(inner: Arc<dyn AssetRenderer>, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl AssetRenderer for ThrottledRenderer {
    async fn render(
        &self,
        file_key: &FileKey,
        transform: &AssetTransform,
        input: Option<ByteStream>,
    ) -> RenderOutcome<RenderResult> {
        self.limiter.acquire(transform.stage()).await;
        self.inner.render(file_key, transform, input).await
    }

    /// Metadata reads are not rate limited.
    async fn get_metadata(&self, asset_path: &Path) -> RenderOutcome<AssetDimensions> {
        self.inner.get_metadata(asset_path).await
    }
}
