//! The seam between the resolver and the node it queries.

use crate::types::NodeBlock;
use alloy_eips::BlockNumberOrTag;
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Failure of an underlying node call.
///
/// The resolver treats these as opaque: they are retried by
/// [`RetryPolicy`](crate::RetryPolicy) and, once retries are exhausted,
/// surfaced to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Creates a new [`TransportError`] from anything message-like.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The two node capabilities the resolver depends on.
///
/// Connection management, authentication and wire protocol all live behind
/// the implementation; the resolver only ever issues these two calls. A
/// block that does not exist is a *successful* call yielding `None`, not a
/// transport failure, and is therefore never retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Debug + Send + Sync {
    /// Number of the most recent block known to the node.
    async fn block_number(&self) -> Result<u64, TransportError>;

    /// The block at `id`, or `None` when the node has no block there.
    async fn block_by_number(
        &self,
        id: BlockNumberOrTag,
    ) -> Result<Option<NodeBlock>, TransportError>;
}
