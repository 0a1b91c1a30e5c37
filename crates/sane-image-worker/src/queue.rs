//! Processing queue: FIFO, single-flight, one attempt per item.
//!
//! Items wait in a queue owned by this object. A drain task is spawned when an item
//! arrives and no drain task is running; it processes items one at a time and exits
//! once it observes the queue empty. An item leaves the queue only after its attempt
//! has finished, whatever the result. Failures, panics and timeouts of one item are
//! logged and never affect the items behind it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;

use sane_image_core::models::{FileKey, ProcessOutcome, QueueItem};
use sane_image_core::{LogLevel, OptimizerConfig, OptimizerError};

use crate::context::QueueItemHandler;

#[derive(Clone, Debug, Default)]
pub struct QueueConfig {
    /// Deadline for a single item. `None` lets a stuck item stall the queue.
    pub item_timeout: Option<Duration>,
}

impl QueueConfig {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            item_timeout: config.item_timeout,
        }
    }
}

/// Counters since the queue was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub optimized: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<QueueItem>,
    draining: bool,
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    handler: Arc<dyn QueueItemHandler>,
    config: QueueConfig,
    /// Runtime the queue was built on; drain tasks are spawned here.
    runtime: Option<Handle>,
    idle: Notify,
    enqueued: AtomicU64,
    optimized: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Clone)]
pub struct OptimizationQueue {
    shared: Arc<Shared>,
}

fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl OptimizationQueue {
    /// Built inside a Tokio runtime, the queue keeps a handle to it and can be fed from
    /// any thread afterwards.
    pub fn new(handler: Arc<dyn QueueItemHandler>, config: QueueConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                handler,
                config,
                runtime: Handle::try_current().ok(),
                idle: Notify::new(),
                enqueued: AtomicU64::new(0),
                optimized: AtomicU64::new(0),
                skipped: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        }
    }

    /// Append an item and make sure a drain task is running.
    ///
    /// Returns the 1-based queue position, counting the item in flight. Without a
    /// runtime to spawn on, the item is rejected and the queue is left as it was.
    pub fn push(&self, item: QueueItem) -> Result<usize, OptimizerError> {
        let runtime = self
            .shared
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(OptimizerError::NoRuntime)?;

        let (position, start_drain) = {
            let mut state = lock(&self.shared.state);
            if state.closed {
                return Err(OptimizerError::QueueClosed);
            }
            state.items.push_back(item);
            let start_drain = !state.draining;
            state.draining = true;
            (state.items.len(), start_drain)
        };

        self.shared.enqueued.fetch_add(1, Ordering::Relaxed);

        if start_drain {
            runtime.spawn(Shared::drain(self.shared.clone()));
        }

        Ok(position)
    }

    /// Items waiting or in flight.
    pub fn pending(&self) -> usize {
        lock(&self.shared.state).items.len()
    }

    pub fn is_draining(&self) -> bool {
        lock(&self.shared.state).draining
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared.state).closed
    }

    /// Stop accepting items. Items already queued are still processed.
    pub fn close(&self) {
        let pending = {
            let mut state = lock(&self.shared.state);
            state.closed = true;
            state.items.len()
        };
        tracing::info!(pending, "Optimization queue closed");
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.shared.enqueued.load(Ordering::Relaxed),
            optimized: self.shared.optimized.load(Ordering::Relaxed),
            skipped: self.shared.skipped.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
        }
    }

    /// Wait until the queue is empty and no drain task is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = lock(&self.shared.state);
                if !state.draining && state.items.is_empty() {
                    return;
                }
            }

            notified.await;
        }
    }
}

impl Shared {
    async fn drain(shared: Arc<Shared>) {
        tracing::debug!("Drain loop started");

        loop {
            let next = {
                let mut state = lock(&shared.state);
                match state.items.front() {
                    Some(item) => Some(item.clone()),
                    None => {
                        state.draining = false;
                        None
                    }
                }
            };

            let Some(item) = next else {
                break;
            };

            shared.process_one(item).await;

            // Only the drain loop removes items, so the head is still the item just processed.
            lock(&shared.state).items.pop_front();
        }

        shared.idle.notify_waiters();
        tracing::debug!("Drain loop finished, queue empty");
    }

    #[tracing::instrument(skip(self, item), fields(item.id = %item.id, file_key = %item.file_key))]
    async fn process_one(&self, item: QueueItem) {
        let file_key = item.file_key.clone();
        tracing::debug!(
            waited_ms = item.enqueued_at.elapsed().as_millis() as u64,
            "Processing queued upload"
        );

        let handler = self.handler.clone();
        let mut task = tokio::spawn(handler.handle(item));

        let joined = match self.config.item_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    let error = anyhow::Error::new(OptimizerError::Timeout {
                        file_key: file_key.clone(),
                        after: limit,
                    });
                    self.record_failure(&file_key, &error);
                    return;
                }
            },
            None => task.await,
        };

        let result = joined
            .map_err(|e| {
                anyhow::Error::new(OptimizerError::Aborted {
                    file_key: file_key.clone(),
                    reason: e.to_string(),
                })
            })
            .and_then(|result| result);

        match result {
            Ok(outcome) => self.record_outcome(&file_key, &outcome),
            Err(error) => self.record_failure(&file_key, &error),
        }
    }

    fn record_outcome(&self, file_key: &FileKey, outcome: &ProcessOutcome) {
        if outcome.is_optimized() {
            self.optimized.fetch_add(1, Ordering::Relaxed);
        } else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
        }
        tracing::debug!(file_key = %file_key, ?outcome, "Queue item finished");
    }

    fn record_failure(&self, file_key: &FileKey, error: &anyhow::Error) {
        self.failed.fetch_add(1, Ordering::Relaxed);

        let level = error
            .downcast_ref::<OptimizerError>()
            .map(OptimizerError::log_level)
            .unwrap_or(LogLevel::Error);
        let message = format!("{:#}", error);

        match level {
            LogLevel::Warn => {
                tracing::warn!(file_key = %file_key, error = %message, "Error processing image")
            }
            LogLevel::Error => {
                tracing::error!(file_key = %file_key, error = %message, "Error processing image")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use sane_image_core::models::{FilePayload, RequestContext, SkipReason, UploadEvent};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct RecordingHandler {
        order: Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
        delay: Duration,
    }

    impl RecordingHandler {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn order(&self) -> Vec<String> {
            self.order.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueItemHandler for RecordingHandler {
        async fn handle(self: Arc<Self>, item: QueueItem) -> Result<ProcessOutcome> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;
            self.order.lock().unwrap().push(item.file_key.to_string());
            self.active.fetch_sub(1, Ordering::SeqCst);

            let key = item.file_key.as_str();
            if key.starts_with("fail") {
                return Err(anyhow!("{}: renderer unavailable", key));
            }
            if key.starts_with("panic") {
                panic!("handler panicked for {}", key);
            }
            if key.starts_with("hang") {
                std::future::pending::<()>().await;
            }
            if key.starts_with("skip") {
                return Ok(ProcessOutcome::Skipped(SkipReason::UnsupportedMediaType {
                    media_type: None,
                }));
            }
            Ok(ProcessOutcome::Optimized {
                file_key: item.file_key,
                original_size: 10,
                final_size: 5,
                width: 1,
                height: 1,
            })
        }
    }

    fn item(key: &str) -> QueueItem {
        QueueItem::from_event(UploadEvent::new(
            key,
            FilePayload::default(),
            RequestContext::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_processed_in_arrival_order_one_at_a_time() {
        let handler = Arc::new(RecordingHandler::with_delay(Duration::from_millis(50)));
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        let keys: Vec<String> = (0..10).map(|i| format!("file-{i}")).collect();
        for (i, key) in keys.iter().enumerate() {
            let position = queue.push(item(key)).unwrap();
            assert_eq!(position, i + 1);
        }

        queue.wait_idle().await;

        assert_eq!(handler.order(), keys);
        assert_eq!(handler.max_active.load(Ordering::SeqCst), 1);
        let stats = queue.stats();
        assert_eq!(stats.enqueued, 10);
        assert_eq!(stats.optimized, 10);
        assert_eq!(stats.failed, 0);
        assert!(!queue.is_draining());
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_item_still_counts_as_pending() {
        let handler = Arc::new(RecordingHandler::with_delay(Duration::from_secs(1)));
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        queue.push(item("a")).unwrap();
        queue.push(item("b")).unwrap();
        tokio::task::yield_now().await;

        assert!(queue.is_draining());
        assert_eq!(queue.pending(), 2);

        queue.wait_idle().await;
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_queue() {
        let handler = Arc::new(RecordingHandler::default());
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        for key in ["a", "fail-b", "skip-c", "d"] {
            queue.push(item(key)).unwrap();
        }
        queue.wait_idle().await;

        assert_eq!(handler.order(), vec!["a", "fail-b", "skip-c", "d"]);
        let stats = queue.stats();
        assert_eq!(stats.optimized, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_is_contained() {
        let handler = Arc::new(RecordingHandler::default());
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        queue.push(item("panic-a")).unwrap();
        queue.push(item("b")).unwrap();
        queue.wait_idle().await;

        assert_eq!(handler.order(), vec!["panic-a", "b"]);
        assert_eq!(queue.stats().failed, 1);
        assert_eq!(queue.stats().optimized, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_releases_queue() {
        let handler = Arc::new(RecordingHandler::default());
        let queue = OptimizationQueue::new(
            handler.clone(),
            QueueConfig {
                item_timeout: Some(Duration::from_secs(5)),
            },
        );

        queue.push(item("hang-a")).unwrap();
        queue.push(item("b")).unwrap();
        queue.wait_idle().await;

        assert_eq!(handler.order(), vec!["hang-a", "b"]);
        assert_eq!(queue.stats().failed, 1);
        assert_eq!(queue.stats().optimized, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_restarts_after_idle() {
        let handler = Arc::new(RecordingHandler::default());
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        queue.push(item("a")).unwrap();
        queue.wait_idle().await;
        assert!(!queue.is_draining());

        queue.push(item("b")).unwrap();
        queue.wait_idle().await;

        assert_eq!(handler.order(), vec!["a", "b"]);
    }

    #[test]
    fn test_push_without_runtime_is_rejected_cleanly() {
        let handler = Arc::new(RecordingHandler::default());
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        assert!(matches!(
            queue.push(item("a")),
            Err(OptimizerError::NoRuntime)
        ));
        assert_eq!(queue.pending(), 0);
        assert!(!queue.is_draining());
        assert_eq!(queue.stats().enqueued, 0);
    }

    #[test]
    fn test_push_from_plain_thread_uses_captured_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let handler = Arc::new(RecordingHandler::default());
        let queue = {
            let _guard = runtime.enter();
            OptimizationQueue::new(handler.clone(), QueueConfig::default())
        };

        let feeder = queue.clone();
        std::thread::spawn(move || {
            feeder.push(item("a")).unwrap();
            feeder.push(item("b")).unwrap();
        })
        .join()
        .unwrap();

        runtime.block_on(queue.wait_idle());
        assert_eq!(handler.order(), vec!["a", "b"]);
        assert_eq!(queue.stats().optimized, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_queue_rejects_but_drains_backlog() {
        let handler = Arc::new(RecordingHandler::with_delay(Duration::from_millis(10)));
        let queue = OptimizationQueue::new(handler.clone(), QueueConfig::default());

        queue.push(item("a")).unwrap();
        queue.push(item("b")).unwrap();
        queue.close();

        assert!(matches!(
            queue.push(item("c")),
            Err(OptimizerError::QueueClosed)
        ));
        queue.wait_idle().await;

        assert!(queue.is_closed());
        assert_eq!(handler.order(), vec!["a", "b"]);
        assert_eq!(queue.stats().enqueued, 2);
    }
}
