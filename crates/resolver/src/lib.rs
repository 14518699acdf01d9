#![doc = include_str!("../README.md")]

mod client;
pub use client::{ChainClient, TransportError};

mod error;
pub use error::ResolverError;

mod retry;
pub use retry::RetryPolicy;

mod throttle;
pub use throttle::ThrottledHead;

mod types;
pub use types::{BlockInterval, NodeBlock};

mod resolver;
pub use resolver::{BlockResolver, ResolverConfig};
