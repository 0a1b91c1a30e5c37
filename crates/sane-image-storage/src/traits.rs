//! File store abstraction trait

use async_trait::async_trait;
use sane_image_core::models::{FileKey, FilePayload, RequestContext};
use sane_image_core::ByteStream;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Do not emit a "file uploaded" notification for this write.
    pub suppress_notification: bool,
}

/// Durable file storage of the host platform.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Replace the bytes and record of `file_key`, returning the key written.
    ///
    /// The stream is consumed until EOF.
    async fn store(
        &self,
        stream: ByteStream,
        payload: &FilePayload,
        file_key: &FileKey,
        context: &RequestContext,
        options: StoreOptions,
    ) -> StorageResult<FileKey>;
}
