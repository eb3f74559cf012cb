//! Broadcast hub implementations.
//!
//! - `channel`: bounded tokio mpsc queue per subscription

pub mod channel;

pub use channel::{ChannelBroadcastHub, DEFAULT_QUEUE_CAPACITY};
