//! Replica state store.
//!
//! One [`Replica`] per peer. Local mutations apply immediately and return a
//! [`ReplicaAction::Publish`] so other peers converge; inbound messages are
//! merged but never re-published, since publishing on receipt would loop
//! forever across the broadcast topic.

use bingo_proto::{ClaimId, GameUpdate, SyncMessage, WinClaim};

use crate::{env::Environment, error::StateError, state::GameState};

/// Actions the replica produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaAction {
    /// Publish a message on the broadcast topic.
    Publish(SyncMessage),

    /// The replica changed; carries the new snapshot for the view layer.
    StateChanged(GameState),
}

/// One peer's copy of the shared game state.
///
/// Generic over the environment so claim ids and timestamps are
/// reproducible in simulation.
#[derive(Debug, Clone)]
pub struct Replica<E: Environment> {
    env: E,
    state: GameState,
}

impl<E: Environment> Replica<E> {
    /// Empty replica, as on a freshly started peer.
    pub fn new(env: E) -> Self {
        Self { env, state: GameState::new() }
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Environment used for time and randomness.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Apply a locally originated partial update and publish it.
    ///
    /// Scalars overwrite; `history` and `bingo_winners` are replaced by the
    /// caller-supplied values, so the caller computes full sequences.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the result would break a state invariant. The
    /// replica is unchanged and nothing is published.
    pub fn apply_local_update(
        &mut self,
        update: GameUpdate,
    ) -> Result<Vec<ReplicaAction>, StateError> {
        if update.is_empty() {
            tracing::debug!("empty local update, nothing to publish");
            return Ok(vec![]);
        }
        self.state.apply_update(&update)?;

        tracing::debug!(
            current = ?self.state.current_problem_id(),
            history_len = self.state.history().len(),
            winners = self.state.bingo_winners().len(),
            "applied local update"
        );

        Ok(vec![
            ReplicaAction::Publish(SyncMessage::UpdateGame(update)),
            ReplicaAction::StateChanged(self.state.clone()),
        ])
    }

    /// Record a local bingo claim and publish it.
    ///
    /// The claim gets a fresh random [`ClaimId`] and the environment's wall
    /// clock as its timestamp.
    pub fn apply_local_bingo_claim(&mut self, name: &str) -> (WinClaim, Vec<ReplicaAction>) {
        let claim =
            WinClaim::new(ClaimId(self.env.random_u64()), name, self.env.wall_clock_millis());
        self.state.merge_claim(claim.clone());

        tracing::info!(claim_id = %claim.claim_id, name, timestamp = claim.timestamp, "bingo claimed");

        let actions = vec![
            ReplicaAction::Publish(SyncMessage::BingoClaim(claim.clone())),
            ReplicaAction::StateChanged(self.state.clone()),
        ];
        (claim, actions)
    }

    /// Merge a message received from another peer.
    ///
    /// Never returns `Publish`. Returns `StateChanged` only if the merge
    /// changed the replica; duplicates and invalid updates are dropped.
    pub fn apply_remote_message(&mut self, message: SyncMessage) -> Vec<ReplicaAction> {
        let kind = message.kind();
        let changed = match message {
            SyncMessage::UpdateGame(update) => match self.state.apply_update(&update) {
                Ok(changed) => changed,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring invalid UPDATE_GAME");
                    return vec![];
                },
            },
            SyncMessage::BingoClaim(claim) => {
                let claim_id = claim.claim_id;
                let inserted = self.state.merge_claim(claim);
                if !inserted {
                    tracing::debug!(%claim_id, "duplicate BINGO_CLAIM ignored");
                }
                inserted
            },
        };

        if changed {
            tracing::debug!(kind, "merged remote message");
            vec![ReplicaAction::StateChanged(self.state.clone())]
        } else {
            vec![]
        }
    }

    /// Decode and merge raw bytes received from the transport.
    ///
    /// Malformed input is logged and ignored; the replica is unchanged.
    pub fn apply_remote_bytes(&mut self, bytes: &[u8]) -> Vec<ReplicaAction> {
        match SyncMessage::decode(bytes) {
            Ok(message) => self.apply_remote_message(message),
            Err(e) => {
                tracing::warn!(error = %e, len = bytes.len(), "dropping malformed message");
                vec![]
            },
        }
    }
}
