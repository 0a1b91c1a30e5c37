//! Hook interface between the host platform's event dispatch and the optimizer.
//!
//! The host calls [`FileUploadHook::on_file_upload`] for every successful upload,
//! including uploads the optimizer itself produces when it re-stores a file. The call
//! is synchronous so that the idempotency guard runs before any queuing decision.

use uuid::Uuid;

use crate::models::UploadEvent;

/// Why an upload notification was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The payload carries the idempotency marker.
    AlreadyOptimized,
    /// The optimizer is shutting down.
    QueueClosed,
    /// The optimizer was built outside a Tokio runtime and none is current.
    NoRuntime,
}

/// What the hook did with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDisposition {
    Ignored(IgnoreReason),
    /// Queued; `position` is 1-based and counts the item currently being processed.
    Enqueued { item_id: Uuid, position: usize },
}

/// Receiver of "file uploaded" notifications.
pub trait FileUploadHook: Send + Sync {
    fn on_file_upload(&self, event: UploadEvent) -> HookDisposition;
}

