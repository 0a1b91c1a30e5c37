use sane_image_core::hooks::{FileUploadHook, HookDisposition, IgnoreReason};
use sane_image_core::models::{QueueItem, UploadEvent};
use sane_image_core::OptimizerError;
use sane_image_worker::OptimizationQueue;

/// Entry point the host calls after every upload.
///
/// Files already carrying the optimized marker are dropped here, before anything is
/// queued, so the optimizer's own re-store can never loop back into the queue.
#[derive(Clone)]
pub struct ImageOptimizerHook {
    queue: OptimizationQueue,
}

impl ImageOptimizerHook {
    pub fn new(queue: OptimizationQueue) -> Self {
        Self { queue }
    }
}

impl FileUploadHook for ImageOptimizerHook {
    fn on_file_upload(&self, event: UploadEvent) -> HookDisposition {
        if event.payload.is_optimized() {
            tracing::debug!(file_key = %event.file_key, "File already optimized, ignoring upload");
            return HookDisposition::Ignored(IgnoreReason::AlreadyOptimized);
        }

        let item = QueueItem::from_event(event);
        let item_id = item.id;
        let file_key = item.file_key.clone();

        match self.queue.push(item) {
            Ok(position) => {
                tracing::debug!(
                    file_key = %file_key,
                    item.id = %item_id,
                    position,
                    "Upload queued for optimization"
                );
                HookDisposition::Enqueued { item_id, position }
            }
            Err(e) => {
                tracing::warn!(file_key = %file_key, error = %e, "Upload not queued");
                let reason = match e {
                    OptimizerError::NoRuntime => IgnoreReason::NoRuntime,
                    _ => IgnoreReason::QueueClosed,
                };
                HookDisposition::Ignored(reason)
            }
        }
    }
}
