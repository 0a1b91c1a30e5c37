use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use sane_image_core::models::RenderStage;
use sane_image_core::RenderLimitConfig;

/// Upper bound for a single wait; `acquire` re-checks the bucket afterwards.
const MAX_WAIT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            tokens: capacity,
            capacity,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let tokens_to_add = elapsed * self.refill_rate;

        self.tokens = (self.tokens + tokens_to_add).min(self.capacity);
        self.last_refill = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_next_token(&self) -> Duration {
        if self.tokens >= 1.0 {
            Duration::from_secs(0)
        } else {
            let tokens_needed = 1.0 - self.tokens;
            let seconds = tokens_needed / self.refill_rate;
            Duration::try_from_secs_f64(seconds.max(0.0))
                .unwrap_or(MAX_WAIT)
                .min(MAX_WAIT)
        }
    }
}

/// Token bucket rate limiter for renderer calls.
///
/// All render stages draw from one bucket, so the limit applies to the renderer as a
/// whole.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimiter {
    /// `rate` tokens per second, holding at most `burst` tokens.
    pub fn new(rate: f64, burst: f64) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(burst.max(1.0), rate))),
        }
    }

    pub fn from_config(config: &RenderLimitConfig) -> Option<Self> {
        config
            .is_enabled()
            .then(|| Self::new(config.rate_per_sec, config.burst))
    }

    /// Acquire a token for the given stage, waiting until one is available
    #[tracing::instrument(skip(self))]
    pub async fn acquire(&self, stage: RenderStage) {
        loop {
            let wait_duration = {
                let mut bucket = self.bucket.lock().await;

                if bucket.try_acquire() {
                    tracing::trace!(
                        stage = %stage,
                        tokens_remaining = bucket.tokens,
                        "Rate limit token acquired"
                    );
                    return;
                }

                bucket.time_until_next_token()
            };

            if wait_duration > Duration::from_secs(0) {
                tracing::debug!(
                    stage = %stage,
                    wait_ms = wait_duration.as_millis() as u64,
                    "Render rate limit reached, waiting for token"
                );
                tokio::time::sleep(wait_duration).await;
            }
        }
    }
}
