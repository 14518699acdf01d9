//! Error taxonomy for resolver operations.

use crate::client::TransportError;
use thiserror::Error;

/// Errors returned by [`BlockResolver`](crate::BlockResolver) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// An underlying node call failed after exhausting its retries.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node reports no block at the requested number.
    #[error("block {0} not found")]
    BlockNotFound(u64),

    /// The head lookup failed while computing a confirmation count.
    #[error("failed to get the confirmation count: {0}")]
    Confirmations(TransportError),
}
