//! Peer input events.
//!
//! Events come from two sources: the local user (teacher or student
//! controls) and the broadcast transport (inbound messages).

use bytes::Bytes;

/// Events processed by the [`crate::Peer`] state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// Teacher: post a random unused problem.
    AdvanceProblem,

    /// Teacher: ask to reset the game. Needs a `ConfirmReset` to take effect.
    RequestReset,

    /// Teacher: confirm a pending reset.
    ConfirmReset,

    /// Teacher: drop a pending reset.
    CancelReset,

    /// Student: flip the mark on one grid cell.
    ToggleCell {
        /// Row-major cell index, `0..16`.
        index: usize,
    },

    /// Student: declare bingo.
    ClaimBingo,

    /// Raw message delivered by the transport.
    MessageReceived(Bytes),

    /// Leave the session.
    Quit,
}

impl PeerEvent {
    /// Short name for logs and rejections.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AdvanceProblem => "advance-problem",
            Self::RequestReset => "request-reset",
            Self::ConfirmReset => "confirm-reset",
            Self::CancelReset => "cancel-reset",
            Self::ToggleCell { .. } => "toggle-cell",
            Self::ClaimBingo => "claim-bingo",
            Self::MessageReceived(_) => "message-received",
            Self::Quit => "quit",
        }
    }
}
