//! Transport errors.
//!
//! Publishing has no error path. Only subscription can fail.

use thiserror::Error;

/// Errors from subscribing to a broadcast channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The channel was closed before subscribing.
    #[error("channel on topic {topic:?} is closed")]
    Closed {
        /// Topic of the closed channel.
        topic: String,
    },

    /// Delivery tasks need a tokio runtime and none is running.
    #[error("subscribe called outside a tokio runtime")]
    NoRuntime,
}
