//! Throttled access to the chain head number.

use crate::{
    client::{ChainClient, TransportError},
    retry::RetryPolicy,
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

/// The last resolved head number and the instant its fetch was started.
#[derive(Debug, Clone, Copy)]
struct HeadSnapshot {
    number: u64,
    fetched_at: Instant,
}

/// Memoized accessor for the current chain head number.
///
/// The head is re-fetched at most once per `min_delay`; calls landing inside
/// the window observe the previously resolved value. The snapshot lock is
/// held across the fetch, so callers that overlap an in-flight refresh wait
/// for it and share its result instead of issuing a second node call.
///
/// A `min_delay` of zero disables the memoization entirely.
#[derive(Debug)]
pub struct ThrottledHead<C> {
    client: Arc<C>,
    retry: RetryPolicy,
    min_delay: Duration,
    snapshot: Mutex<Option<HeadSnapshot>>,
}

impl<C> ThrottledHead<C> {
    /// Creates a new [`ThrottledHead`] around `client`.
    pub fn new(client: Arc<C>, retry: RetryPolicy, min_delay: Duration) -> Self {
        Self { client, retry, min_delay, snapshot: Mutex::new(None) }
    }
}

impl<C: ChainClient> ThrottledHead<C> {
    /// The current head number, re-fetched at most once per `min_delay`.
    pub async fn number(&self) -> Result<u64, TransportError> {
        let mut snapshot = self.snapshot.lock().await;
        if self.min_delay > Duration::ZERO {
            if let Some(snap) = snapshot.as_ref() {
                if snap.fetched_at.elapsed() < self.min_delay {
                    return Ok(snap.number);
                }
            }
        }

        // The window is measured from the instant the fetch starts, not the
        // instant it resolves.
        let fetched_at = Instant::now();
        debug!(target: "resolver", "Fetching last block number");
        let number = self.retry.run(|| self.client.block_number()).await?;
        *snapshot = Some(HeadSnapshot { number, fetched_at });
        Ok(number)
    }
}
