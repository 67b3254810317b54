//! Peer session errors.

use bingo_core::{GridError, StateError};
use thiserror::Error;

use crate::Role;

/// Errors from peer sessions.
///
/// None are fatal. Most are reported to the user as
/// [`crate::Notice::Rejected`] and leave the peer unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeerError {
    /// Student display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The event belongs to the other role.
    #[error("{event} is not available to a {role}")]
    WrongRole {
        /// Event name.
        event: &'static str,
        /// Role of this peer.
        role: Role,
    },

    /// `ConfirmReset` arrived with no reset requested.
    #[error("no reset is pending")]
    NoPendingReset,

    /// Grid generation, marking, or claim failed.
    #[error("grid: {0}")]
    Grid(#[from] GridError),

    /// A local update would break a state invariant.
    #[error("state: {0}")]
    State(#[from] StateError),
}

impl PeerError {
    /// Returns true if retrying the same event later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Grid(e) => e.is_transient(),
            Self::NoPendingReset => true,
            Self::EmptyDisplayName | Self::WrongRole { .. } | Self::State(_) => false,
        }
    }
}
