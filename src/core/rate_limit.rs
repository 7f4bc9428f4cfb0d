use crate::models::SearchActorsResponse;
use crate::services::bluesky::{ActorSearch, BlueskyError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-window call limiter
///
/// Admits at most `max_calls` calls in any trailing `period`. A call that
/// would exceed the budget waits until the oldest recorded call leaves the
/// window. State lives for as long as the limiter does; wrap one limiter
/// around each operation that shares a budget.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a limiter. `max_calls` of zero is treated as one.
    pub fn new(max_calls: usize, period: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            period,
            calls: VecDeque::with_capacity(max_calls.min(1024)),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of calls currently recorded in the window
    pub fn recorded_calls(&self) -> usize {
        self.calls.len()
    }

    /// Wait for admission and record the call
    ///
    /// Returns how long the caller was held back.
    pub async fn acquire(&mut self) -> Duration {
        let now = Instant::now();
        self.prune(now);

        let mut waited = Duration::ZERO;
        if self.calls.len() >= self.max_calls {
            if let Some(&oldest) = self.calls.front() {
                let ready_at = oldest + self.period;
                if ready_at > now {
                    waited = ready_at - now;
                    tracing::info!(
                        "Rate limit reached. Sleeping for {:.2} seconds...",
                        waited.as_secs_f64()
                    );
                    tokio::time::sleep_until(ready_at).await;
                }
                self.calls.pop_front();
            }
        }

        self.calls.push_back(Instant::now());
        waited
    }

    /// Run `f` once admitted, returning its output unchanged
    pub async fn call<F, Fut, T>(&mut self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire().await;
        f().await
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.calls.front() {
            if now.duration_since(oldest) >= self.period {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Actor search whose every call goes through a shared [`RateLimiter`]
pub struct RateLimitedSearch<S> {
    inner: S,
    limiter: Mutex<RateLimiter>,
}

impl<S> RateLimitedSearch<S> {
    pub fn new(inner: S, limiter: RateLimiter) -> Self {
        Self {
            inner,
            limiter: Mutex::new(limiter),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Calls recorded in the limiter's current window
    pub async fn recorded_calls(&self) -> usize {
        self.limiter.lock().await.recorded_calls()
    }
}

#[async_trait]
impl<S: ActorSearch> ActorSearch for RateLimitedSearch<S> {
    async fn search_actors(
        &self,
        term: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<SearchActorsResponse, BlueskyError> {
        // Held across the remote call so callers are serialized, not just paced
        let mut limiter = self.limiter.lock().await;
        limiter
            .call(|| self.inner.search_actors(term, limit, cursor))
            .await
    }
}
