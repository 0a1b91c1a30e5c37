//! In-memory file store
//!
//! Keeps files in a map and, unless a write asks for suppression, re-emits a
//! "file uploaded" notification to the registered hook the way the host platform
//! does after every upload.

use async_trait::async_trait;
use bytes::Bytes;
use sane_image_core::models::{FileKey, FilePayload, RequestContext, UploadEvent};
use sane_image_core::{stream, ByteStream, FileUploadHook};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, Weak};

use crate::traits::{FileStore, StorageError, StorageResult, StoreOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub data: Bytes,
    pub payload: FilePayload,
    /// Number of times the file has been written.
    pub revision: u32,
}

#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<FileKey, StoredFile>>,
    upload_hook: Mutex<Option<Weak<dyn FileUploadHook>>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the receiver of upload notifications. Held weakly: the hook usually
    /// owns (through its queue) a reference back to this store.
    pub fn set_upload_hook(&self, hook: Weak<dyn FileUploadHook>) {
        *lock(&self.upload_hook) = Some(hook);
    }

    /// Seed a file as if the host had just accepted an upload, without notifying.
    pub fn insert(&self, file_key: FileKey, data: impl Into<Bytes>, payload: FilePayload) {
        lock(&self.files).insert(
            file_key,
            StoredFile {
                data: data.into(),
                payload,
                revision: 1,
            },
        );
    }

    pub fn get(&self, file_key: &FileKey) -> Option<StoredFile> {
        lock(&self.files).get(file_key).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.files).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.files).is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn store(
        &self,
        body: ByteStream,
        payload: &FilePayload,
        file_key: &FileKey,
        context: &RequestContext,
        options: StoreOptions,
    ) -> StorageResult<FileKey> {
        if file_key.as_str().is_empty() {
            return Err(StorageError::InvalidKey("empty file key".to_string()));
        }

        let data = stream::collect(body).await?;
        let size = data.len();

        {
            let mut files = lock(&self.files);
            let revision = files.get(file_key).map(|f| f.revision + 1).unwrap_or(1);
            files.insert(
                file_key.clone(),
                StoredFile {
                    data,
                    payload: payload.clone(),
                    revision,
                },
            );
        }

        tracing::debug!(
            file_key = %file_key,
            size_bytes = size,
            suppress_notification = options.suppress_notification,
            "File stored"
        );

        if !options.suppress_notification {
            let hook = lock(&self.upload_hook).as_ref().and_then(Weak::upgrade);
            if let Some(hook) = hook {
                let event = UploadEvent::new(file_key.clone(), payload.clone(), context.clone());
                let disposition = hook.on_file_upload(event);
                tracing::debug!(file_key = %file_key, ?disposition, "Upload notification emitted");
            }
        }

        Ok(file_key.clone())
    }
}
