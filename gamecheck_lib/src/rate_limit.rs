//! Request pacing and retry for a single source.
//!
//! Each source gets its own [`RateLimiter`] so a slow site never delays
//! the others. Consecutive requests to one source are spaced by a base
//! delay plus random jitter; failures worth retrying back off
//! exponentially.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::scrape::ScrapeError;

/// Minimum spacing between requests, with up to `jitter` added at random.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    delay: Duration,
    jitter: Duration,
    tracker: RequestTracker,
}

impl RateLimiter {
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            delay,
            jitter,
            tracker: RequestTracker::new(),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Waits until the spacing since the previous request has passed, then
    /// records this request. The first request goes out immediately.
    ///
    /// The lock is held while sleeping so concurrent callers queue up
    /// behind each other instead of firing together.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let wait = self.next_delay();
            let elapsed = previous.elapsed();
            if elapsed < wait {
                sleep(wait - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let extra = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(extra)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }
}

/// Atomic counters of request outcomes.
pub struct RequestTracker {
    requests_made: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_retried: AtomicU64,
    requests_failed: AtomicU64,
    total_backoff_ms: AtomicU64,
}

impl RequestTracker {
    fn new() -> Self {
        Self {
            requests_made: AtomicU64::new(0),
            requests_succeeded: AtomicU64::new(0),
            requests_retried: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            total_backoff_ms: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self, backoff: Duration) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_retried.fetch_add(1, Ordering::Relaxed);
        self.total_backoff_ms
            .fetch_add(backoff.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_retried: self.requests_retried.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            total_backoff_secs: self.total_backoff_ms.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Snapshot of tracker counters for display.
#[derive(Debug, Clone, Default)]
pub struct TrackerSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_retried: u64,
    pub requests_failed: u64,
    pub total_backoff_secs: f64,
}

/// Exponential backoff with jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// `base * 2^(attempt-1)`, capped, then scaled by a 0.8-1.2 jitter.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(30) as u32;
        let base = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        base.mul_f64(jitter)
    }
}

/// Runs `operation` behind the limiter, retrying retryable failures.
pub async fn with_retry<T, F, Fut>(
    limiter: &RateLimiter,
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let tracker = limiter.tracker();
    let mut attempt = 0usize;
    loop {
        limiter.acquire().await;
        match operation().await {
            Ok(value) => {
                tracker.record_success();
                return Ok(value);
            }
            Err(err) => {
                attempt += 1;
                if attempt > policy.max_retries || !err.is_retryable() {
                    tracker.record_failure();
                    return Err(err);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracker.record_retry(delay);
                tracing::warn!(
                    "{} request failed (attempt {}/{}): {}; retrying in {:.1}s",
                    label,
                    attempt,
                    policy.max_retries,
                    err,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }
        }
    }
}
