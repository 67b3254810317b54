//! Protocol error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding a [`crate::SyncMessage`].
///
/// Decoding errors are never fatal for a peer: the receiver drops the
/// message and keeps its replica unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Inbound bytes exceed [`crate::MAX_MESSAGE_SIZE`].
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge {
        /// Size of the rejected input.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// CBOR serialization failed.
    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed (malformed bytes, wrong shape, unknown
    /// variant).
    #[error("CBOR decode failed: {0}")]
    CborDecode(String),

    /// Bytes left over after one complete message.
    #[error("{count} trailing bytes after message")]
    TrailingBytes {
        /// Unread bytes.
        count: usize,
    },
}
