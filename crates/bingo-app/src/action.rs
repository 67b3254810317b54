//! Peer side-effects and user-facing notices.

use bingo_core::GameState;
use bingo_proto::WinClaim;
use bytes::Bytes;

use crate::PeerError;

/// Actions produced by the Peer state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerAction {
    /// Publish encoded bytes on the broadcast topic.
    Publish(Bytes),

    /// The shared game state changed.
    StateChanged(GameState),

    /// The local grid changed (student only). Never published.
    GridChanged,

    /// Show something to the user.
    Notify(Notice),

    /// Leave the session.
    Quit,
}

/// Messages for the user that do not change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Every problem in the bank has been posted.
    ProblemsExhausted,

    /// A reset is pending; ask the teacher to confirm or cancel.
    ConfirmReset,

    /// The local bingo claim was accepted and published.
    BingoConfirmed(WinClaim),

    /// The event was refused.
    Rejected(PeerError),
}
