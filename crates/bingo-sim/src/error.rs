//! Simulator errors.

use bingo_app::PeerError;
use bingo_core::BankError;
use bingo_transport::TransportError;
use thiserror::Error;

/// Errors that stop a simulated classroom.
#[derive(Debug, Error)]
pub enum SimError {
    /// The problem bank could not be built.
    #[error("problem bank: {0}")]
    Bank(#[from] BankError),

    /// A peer session could not start.
    #[error("peer: {0}")]
    Peer(#[from] PeerError),

    /// A channel could not subscribe.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// A peer task panicked or was cancelled.
    #[error("peer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
