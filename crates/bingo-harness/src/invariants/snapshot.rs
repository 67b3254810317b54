//! Observable state snapshots for invariant checking.
//!
//! Invariants operate on snapshots rather than live peers so every check in
//! one pass sees the same moment of the simulation.

use bingo_app::{Environment, Peer, Role};
use bingo_core::{GameState, WinClaim};

/// Snapshot of every peer plus what the network allows us to expect.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-peer state, teacher first.
    pub peers: Vec<PeerSnapshot>,

    /// Every published message reached every peer that was joined when it
    /// was published, and nothing is in flight.
    pub fully_delivered: bool,

    /// No confirmed reset raced with a claim. Winners only converge when
    /// this holds, since a reset and a claim do not commute.
    pub reset_free: bool,
}

impl SystemSnapshot {
    /// Snapshot with no peers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot of the given peers, with no convergence expectations.
    pub fn from_peers(peers: Vec<PeerSnapshot>) -> Self {
        Self { peers, ..Self::default() }
    }

    /// Add a peer snapshot.
    pub fn add_peer(&mut self, peer: PeerSnapshot) {
        self.peers.push(peer);
    }
}

/// Snapshot of one peer's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    /// Position in the simulation.
    pub id: usize,
    /// Display name.
    pub name: String,
    /// Teacher or student.
    pub role: Role,
    /// Replica of the shared state.
    pub state: GameState,
    /// Marked cells (students only).
    pub marked: Vec<usize>,
    /// Whether the grid currently shows a completed line.
    pub has_bingo: bool,
    /// Whether the grid is frozen by a claim.
    pub grid_claimed: bool,
    /// The peer's own accepted claim.
    pub claim: Option<WinClaim>,
}

impl PeerSnapshot {
    /// Capture a peer.
    pub fn capture<E: Environment>(id: usize, peer: &Peer<E>) -> Self {
        let grid = peer.grid();
        Self {
            id,
            name: peer.identity().display_name.clone(),
            role: peer.identity().role,
            state: peer.state().clone(),
            marked: grid.map(|g| g.marked_indices()).unwrap_or_default(),
            has_bingo: grid.is_some_and(|g| g.has_bingo()),
            grid_claimed: grid.is_some_and(|g| g.is_claimed()),
            claim: peer.claim().cloned(),
        }
    }
}
