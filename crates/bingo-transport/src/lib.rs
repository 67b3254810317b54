//! Broadcast transport
//!
//! Named-topic publish/subscribe between peers in one process. Every channel
//! opened on the same topic of a [`BroadcastHub`] hears every other channel's
//! messages, but never its own.
//!
//! # Delivery guarantees
//!
//! - At most once, best effort. Publishing never blocks and never fails.
//! - Messages from one sender reach a given receiver in send order. There is
//!   no ordering across senders.
//! - A channel only hears messages published after it subscribed. There is no
//!   replay for late joiners.
//! - A receiver that falls more than [`ChannelConfig::capacity`] messages
//!   behind loses the oldest ones.
//!
//! Handlers run on a tokio task, asynchronously relative to `publish`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod hub;

use bytes::Bytes;
pub use config::{ChannelConfig, DEFAULT_CAPACITY, DEFAULT_TOPIC};
pub use error::TransportError;
pub use hub::{BroadcastHub, LocalChannel};

/// A named broadcast topic as seen by one peer.
pub trait Transport: Send + Sync {
    /// Send `payload` to every other channel currently subscribed to the
    /// topic.
    ///
    /// Fire-and-forget: a topic with no listeners drops the message, and a
    /// closed channel ignores the call.
    fn publish(&self, payload: Bytes);

    /// Register `handler` to run once per delivered message.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` if the channel was closed
    /// - `TransportError::NoRuntime` if called outside a tokio runtime
    fn subscribe<F>(&self, handler: F) -> Result<(), TransportError>
    where
        F: FnMut(Bytes) + Send + 'static;

    /// Unsubscribe and release the topic.
    ///
    /// Afterwards `publish` is a no-op and no handler runs again. Closing
    /// twice is harmless.
    fn close(&self);

    /// True once [`Transport::close`] has been called.
    fn is_closed(&self) -> bool;
}
