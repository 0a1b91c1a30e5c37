//! Test helpers: a scriptable asset renderer and payload fixtures.
//!
//! Run from workspace root: `cargo test -p sane-image-hook`.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use sane_image_core::models::{AssetTransform, FileKey, FilePayload};
use sane_image_core::{stream, ByteStream};
use sane_image_processing::{
    AssetDimensions, AssetRenderer, RenderError, RenderOutcome, RenderResult,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One call observed by [`MockRenderer`].
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub file_key: FileKey,
    pub transform: AssetTransform,
    pub had_input: bool,
}

/// Renderer double. Optimize renders fit the configured source dimensions into the
/// plan's box and report `optimized_size`; watermark renders keep the base
/// dimensions and add `watermark_overhead` bytes.
pub struct MockRenderer {
    calls: Mutex<Vec<RenderCall>>,
    sources: Mutex<HashMap<FileKey, (u32, u32)>>,
    base_dimensions: Mutex<HashMap<FileKey, (u32, u32)>>,
    optimized_sizes: Mutex<HashMap<FileKey, u64>>,
    failing: Mutex<HashSet<FileKey>>,
    metadata_calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    default_source: (u32, u32),
    optimized_size: u64,
    watermark_overhead: u64,
    watermark_dimensions: Option<AssetDimensions>,
    delay: Duration,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            sources: Mutex::new(HashMap::new()),
            base_dimensions: Mutex::new(HashMap::new()),
            optimized_sizes: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            metadata_calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            default_source: (3000, 2000),
            optimized_size: 1_200_000,
            watermark_overhead: 40_000,
            watermark_dimensions: Some(AssetDimensions {
                width: 500,
                height: 250,
            }),
            delay: Duration::ZERO,
        }
    }
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, key: &str, width: u32, height: u32) -> Self {
        self.sources
            .lock()
            .unwrap()
            .insert(FileKey::from(key), (width, height));
        self
    }

    pub fn with_optimized_size(self, key: &str, size: u64) -> Self {
        self.optimized_sizes
            .lock()
            .unwrap()
            .insert(FileKey::from(key), size);
        self
    }

    /// Every render call sleeps for `delay` first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// `get_metadata` fails, as if the watermark file were missing.
    pub fn without_watermark_metadata(mut self) -> Self {
        self.watermark_dimensions = None;
        self
    }

    pub fn failing_on(self, key: &str) -> Self {
        self.failing.lock().unwrap().insert(FileKey::from(key));
        self
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, key: &str) -> Vec<RenderCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.file_key.as_str() == key)
            .collect()
    }

    /// File keys in the order their optimize render started.
    pub fn optimize_order(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c.transform, AssetTransform::Optimize(_)))
            .map(|c| c.file_key.to_string())
            .collect()
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetRenderer for MockRenderer {
    async fn render(
        &self,
        file_key: &FileKey,
        transform: &AssetTransform,
        input: Option<ByteStream>,
    ) -> RenderOutcome<RenderResult> {
        self.calls.lock().unwrap().push(RenderCall {
            file_key: file_key.clone(),
            transform: transform.clone(),
            had_input: input.is_some(),
        });

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(file_key) {
            return Err(RenderError::Failed(format!("backend rejected {}", file_key)));
        }

        match transform {
            AssetTransform::Optimize(plan) => {
                let (src_w, src_h) = self
                    .sources
                    .lock()
                    .unwrap()
                    .get(file_key)
                    .copied()
                    .unwrap_or(self.default_source);
                let (width, height) = plan.fitted_dimensions(src_w, src_h);
                self.base_dimensions
                    .lock()
                    .unwrap()
                    .insert(file_key.clone(), (width, height));
                let size = self
                    .optimized_sizes
                    .lock()
                    .unwrap()
                    .get(file_key)
                    .copied()
                    .unwrap_or(self.optimized_size);
                Ok(RenderResult {
                    stream: stream::from_bytes(Bytes::from(format!("avif:{}", file_key))),
                    width,
                    height,
                    size,
                })
            }
            AssetTransform::Watermark(plan) => {
                let Some(input) = input else {
                    return Err(RenderError::Unsupported(
                        "watermark needs an input stream".to_string(),
                    ));
                };
                let base = stream::collect(input).await?;
                let (width, height) = self
                    .base_dimensions
                    .lock()
                    .unwrap()
                    .get(file_key)
                    .copied()
                    .unwrap_or((plan.overlay_width, plan.overlay_height));
                let base_size = self
                    .optimized_sizes
                    .lock()
                    .unwrap()
                    .get(file_key)
                    .copied()
                    .unwrap_or(self.optimized_size);
                let mut data = base.to_vec();
                data.extend_from_slice(b"+wm");
                Ok(RenderResult {
                    stream: stream::from_bytes(data),
                    width,
                    height,
                    size: base_size + self.watermark_overhead,
                })
            }
        }
    }

    async fn get_metadata(&self, asset_path: &Path) -> RenderOutcome<AssetDimensions> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.watermark_dimensions
            .ok_or_else(|| RenderError::NotFound(asset_path.display().to_string()))
    }
}

pub fn image_payload(media_type: &str, filesize: u64) -> FilePayload {
    FilePayload {
        media_type: Some(media_type.to_string()),
        filesize,
        width: Some(3000),
        height: Some(2000),
        filename_download: Some("photo.jpg".to_string()),
        ..Default::default()
    }
}
