//! Fixed-delay retry around node calls.

use std::{fmt::Display, future::Future, time::Duration};
use tokio::time::sleep;
use tracing::warn;

/// Retry policy applied to every node call issued by the resolver.
///
/// The delay between attempts is fixed: no exponential backoff, no jitter.
/// On exhaustion the last observed error is returned unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. Zero means a single
    /// attempt and no retry.
    pub max_retries: u32,
    /// Pause between consecutive attempts.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new [`RetryPolicy`].
    pub const fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self { max_retries, retry_delay }
    }

    /// Runs `op`, retrying on failure up to `max_retries` more times with a
    /// fixed [`retry_delay`](Self::retry_delay) between attempts.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut remaining = self.max_retries;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if remaining > 0 => {
                    remaining -= 1;
                    warn!(
                        target: "resolver",
                        %err,
                        remaining,
                        delay_ms = self.retry_delay.as_millis() as u64,
                        "Node call failed, retrying"
                    );
                    sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, Duration::ZERO)
    }
}
