//! Resolution of timestamps to bracketing block numbers.

use crate::{
    client::ChainClient,
    error::ResolverError,
    retry::RetryPolicy,
    throttle::ThrottledHead,
    types::{BlockInterval, NodeBlock},
};
use alloy_eips::BlockNumberOrTag;
use std::{cmp::Ordering, collections::BTreeMap, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::debug;

/// Construction-time configuration for a [`BlockResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Lowest block number the resolver will ever report or search below.
    /// Typically the block the watched contract was deployed in.
    pub significant_block: u64,
    /// Pause between retries of a failed node call.
    pub retry_delay: Duration,
    /// Additional attempts after the first failure of a node call.
    pub max_retries: u32,
    /// Minimum delay between two fetches of the chain head number. Zero
    /// re-fetches on every call.
    pub min_head_fetch_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            significant_block: 0,
            retry_delay: Duration::ZERO,
            max_retries: 0,
            min_head_fetch_delay: Duration::ZERO,
        }
    }
}

/// Outcome of narrowing the search bounds from already-cached timestamps.
enum Narrowed {
    /// A cached block matches the queried timestamp exactly.
    Exact(u64),
    /// Tightest bracket derivable from the cache alone.
    Bracket { low: u64, high: u64 },
}

/// Resolves wall-clock timestamps to bracketing block numbers on one ledger.
///
/// One resolver is constructed per node connection. Its timestamp cache is
/// write-once and lives for the lifetime of the resolver: for a given block
/// number the node is queried at most once. Two resolutions racing on the
/// same uncached block may both fetch it; the fetch is idempotent and the
/// second write stores an equal value, so the race is tolerated rather than
/// locked out.
#[derive(Debug)]
pub struct BlockResolver<C> {
    client: Arc<C>,
    /// Blocks below this number are never reported.
    significant_block: u64,
    retry: RetryPolicy,
    head: ThrottledHead<C>,
    /// Sparse block number to timestamp cache, populated lazily.
    timestamps: Mutex<BTreeMap<u64, u64>>,
}

impl<C: ChainClient> BlockResolver<C> {
    /// Creates a new [`BlockResolver`] querying `client`.
    pub fn new(client: Arc<C>, config: ResolverConfig) -> Self {
        let retry = RetryPolicy::new(config.max_retries, config.retry_delay);
        let head = ThrottledHead::new(client.clone(), retry, config.min_head_fetch_delay);
        Self {
            client,
            significant_block: config.significant_block,
            retry,
            head,
            timestamps: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of the most recent block known to the node, throttled per the
    /// configured minimum head-fetch delay.
    pub async fn last_block_number(&self) -> Result<u64, ResolverError> {
        Ok(self.head.number().await?)
    }

    /// Number of the block right below the head.
    ///
    /// Searches are anchored here rather than at the head itself because the
    /// newest block's data may not be retrievable from the node yet.
    pub async fn second_last_block_number(&self) -> Result<u64, ResolverError> {
        Ok(self.head.number().await?.saturating_sub(1))
    }

    /// Timestamp of block `number`, served from the cache when present.
    ///
    /// A missing block is reported as [`ResolverError::BlockNotFound`]
    /// immediately: the node answered, there is just nothing there, so the
    /// retry loop does not re-ask.
    pub async fn block_timestamp(&self, number: u64) -> Result<u64, ResolverError> {
        if let Some(&timestamp) = self.timestamps.lock().await.get(&number) {
            return Ok(timestamp);
        }

        debug!(target: "resolver", number, "Fetching block timestamp");
        let block = self
            .retry
            .run(|| self.client.block_by_number(BlockNumberOrTag::Number(number)))
            .await?
            .ok_or(ResolverError::BlockNotFound(number))?;

        self.timestamps.lock().await.entry(number).or_insert(block.timestamp);
        Ok(block.timestamp)
    }

    /// Number of blocks mined on top of block `number`.
    ///
    /// Can be negative when the queried block number is above the currently
    /// reported head.
    pub async fn confirmations(&self, number: u64) -> Result<i64, ResolverError> {
        let head = self.head.number().await.map_err(ResolverError::Confirmations)?;
        Ok(head as i64 - number as i64)
    }

    /// Fetches the block at `id` straight from the node, bypassing the
    /// timestamp cache.
    pub async fn block_by_id(&self, id: BlockNumberOrTag) -> Result<Option<NodeBlock>, ResolverError> {
        Ok(self.retry.run(|| self.client.block_by_number(id)).await?)
    }

    /// The pair of adjacent block numbers whose timestamps bracket
    /// `timestamp`.
    ///
    /// Queries at or below the significant block's timestamp clamp to the
    /// significant block; queries beyond the second-last block's timestamp
    /// clamp to the second-last block. Everything in between is located by a
    /// dichotomic search seeded from the cache.
    pub async fn block_interval_by_timestamp(
        &self,
        timestamp: i64,
    ) -> Result<BlockInterval, ResolverError> {
        let significant_ts = self.block_timestamp(self.significant_block).await?;
        let second_last = self.second_last_block_number().await?;
        let second_last_ts = self.block_timestamp(second_last).await?;

        if timestamp <= significant_ts as i64 {
            return Ok(BlockInterval::exact(self.significant_block));
        }
        if timestamp > second_last_ts as i64 {
            return Ok(BlockInterval::exact(second_last));
        }

        let (low, high) = {
            let cache = self.timestamps.lock().await;
            match narrow_bounds(&cache, timestamp, self.significant_block, second_last) {
                Narrowed::Exact(number) => return Ok(BlockInterval::exact(number)),
                Narrowed::Bracket { low, high } => (low, high),
            }
        };
        self.bisect(timestamp, low, high).await
    }

    /// Dichotomic search for the bracket of `timestamp` between `low` and
    /// `high`, caching every timestamp it fetches along the way.
    async fn bisect(
        &self,
        timestamp: i64,
        mut low: u64,
        mut high: u64,
    ) -> Result<BlockInterval, ResolverError> {
        debug!(target: "resolver", low, high, timestamp, "Starting dichotomic search");
        loop {
            let mid = low + (high - low) / 2;
            let mid_ts = self.block_timestamp(mid).await? as i64;

            match mid_ts.cmp(&timestamp) {
                Ordering::Less => low = mid,
                Ordering::Greater => high = mid,
                Ordering::Equal => return Ok(BlockInterval::exact(mid)),
            }

            if high == low + 1 {
                return Ok(BlockInterval::new(low, high));
            }
        }
    }
}

/// Tightens the initial `(significant, second_last)` search bounds using only
/// timestamps already in the cache, without touching the node.
///
/// Walks the cached entries upward from the significant block; the first
/// entry whose timestamp exceeds the query closes the bracket. An entry
/// matching the query exactly short-circuits the whole search. Both bounding
/// blocks are guaranteed cached by the caller, so the walk always terminates
/// at `second_last` at the latest.
fn narrow_bounds(
    cache: &BTreeMap<u64, u64>,
    timestamp: i64,
    significant: u64,
    second_last: u64,
) -> Narrowed {
    let mut low = significant;
    let mut high = second_last;

    for (&number, &ts) in cache.range(significant..=second_last) {
        if ts as i64 == timestamp {
            return Narrowed::Exact(number);
        }
        low = high;
        high = number;
        if ts as i64 > timestamp {
            break;
        }
    }

    Narrowed::Bracket { low, high }
}
