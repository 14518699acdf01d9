//! Core types shared across the resolver.

use derive_more::Constructor;

/// Minimal view of a block as returned by the queried node.
///
/// The resolver only ever looks at the block's position and its recorded
/// timestamp; everything else the node attaches to a block is irrelevant here.
#[derive(Constructor, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeBlock {
    /// Position of the block on the ledger.
    pub number: u64,
    /// Timestamp recorded in the block, in seconds.
    pub timestamp: u64,
}

/// Pair of block numbers bracketing a queried timestamp.
///
/// Either `before == after` (exact timestamp match, or the query was clamped
/// to a boundary), or `after == before + 1` and the queried timestamp falls
/// strictly between the two blocks' timestamps.
#[derive(Constructor, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockInterval {
    /// Last block at or before the queried timestamp.
    pub before: u64,
    /// First block at or after the queried timestamp.
    pub after: u64,
}

impl BlockInterval {
    /// An interval collapsed onto a single block number.
    pub const fn exact(number: u64) -> Self {
        Self { before: number, after: number }
    }
}
