use std::time::Instant;
use uuid::Uuid;

use super::file::{FileKey, FilePayload, RequestContext, UploadEvent};

/// An upload waiting for (or undergoing) optimization.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: Uuid,
    pub file_key: FileKey,
    pub payload: FilePayload,
    pub context: RequestContext,
    pub enqueued_at: Instant,
}

impl QueueItem {
    pub fn from_event(event: UploadEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_key: event.file_key,
            payload: event.payload,
            context: event.context,
            enqueued_at: Instant::now(),
        }
    }
}
