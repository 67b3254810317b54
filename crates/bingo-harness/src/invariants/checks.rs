//! Standard invariant checks.
//!
//! The first four hold on every peer at every step, whatever the network
//! does. The convergence checks only apply once the snapshot says delivery
//! is complete.

use std::{cmp::Ordering, collections::HashSet};

use bingo_app::Role;
use bingo_core::winner_order;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// No problem id appears twice in any peer's history.
pub struct HistoryUnique;

impl Invariant for HistoryUnique {
    fn name(&self) -> &'static str {
        "history_unique"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for peer in &state.peers {
            let mut seen = HashSet::new();
            if let Some(dup) = peer.state.history().iter().find(|id| !seen.insert(**id)) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("peer {} ({}): problem {dup} posted twice", peer.id, peer.name),
                });
            }
        }
        Ok(())
    }
}

/// A current problem, if any, is in the history.
pub struct CurrentInHistory;

impl Invariant for CurrentInHistory {
    fn name(&self) -> &'static str {
        "current_in_history"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for peer in &state.peers {
            if let Some(current) = peer.state.current_problem_id()
                && !peer.state.is_posted(current)
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "peer {}: current problem {current} not in history {:?}",
                        peer.id,
                        peer.state.history()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Winners are unique by claim id and ordered newest first.
pub struct WinnersOrdered;

impl Invariant for WinnersOrdered {
    fn name(&self) -> &'static str {
        "winners_ordered"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for peer in &state.peers {
            let winners = peer.state.bingo_winners();

            let ids: HashSet<_> = winners.iter().map(|c| c.claim_id).collect();
            if ids.len() != winners.len() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("peer {}: duplicate claim id in winners", peer.id),
                });
            }

            if let Some(pair) =
                winners.windows(2).find(|w| winner_order(&w[0], &w[1]) != Ordering::Less)
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "peer {}: {} ({}) listed before {} ({})",
                        peer.id, pair[0].name, pair[0].timestamp, pair[1].name, pair[1].timestamp
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A student's own claim is backed by a frozen grid with a completed line.
pub struct ClaimsBackedByBingo;

impl Invariant for ClaimsBackedByBingo {
    fn name(&self) -> &'static str {
        "claims_backed_by_bingo"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for peer in &state.peers {
            let Some(claim) = &peer.claim else { continue };

            if peer.role != Role::Student || !peer.grid_claimed || !peer.has_bingo {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "peer {} claimed without a frozen winning grid (marked {:?})",
                        peer.id, peer.marked
                    ),
                });
            }
            if claim.name != peer.name {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("peer {} claimed as {:?}", peer.name, claim.name),
                });
            }
        }
        Ok(())
    }
}

/// Once delivery is complete, every peer shows the teacher's problem and
/// history.
///
/// Only the teacher writes those fields and per-sender order is preserved,
/// so the last teacher update wins everywhere.
pub struct ProblemConvergence;

impl Invariant for ProblemConvergence {
    fn name(&self) -> &'static str {
        "problem_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if !state.fully_delivered {
            return Ok(());
        }
        let Some(teacher) = state.peers.iter().find(|p| p.role == Role::Teacher) else {
            return Ok(());
        };

        for peer in &state.peers {
            if peer.state.current_problem_id() != teacher.state.current_problem_id()
                || peer.state.history() != teacher.state.history()
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "peer {} shows {:?}/{:?}, teacher shows {:?}/{:?}",
                        peer.id,
                        peer.state.current_problem_id(),
                        peer.state.history(),
                        teacher.state.current_problem_id(),
                        teacher.state.history()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Once delivery is complete in a reset-free run, every peer holds the same
/// winners and every accepted claim is among them.
pub struct WinnerConvergence;

impl Invariant for WinnerConvergence {
    fn name(&self) -> &'static str {
        "winner_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if !state.fully_delivered || !state.reset_free {
            return Ok(());
        }
        let Some(first) = state.peers.first() else {
            return Ok(());
        };

        for peer in &state.peers {
            if peer.state.bingo_winners() != first.state.bingo_winners() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "peer {} has {} winners, peer {} has {}",
                        peer.id,
                        peer.state.bingo_winners().len(),
                        first.id,
                        first.state.bingo_winners().len()
                    ),
                });
            }
            if let Some(claim) = &peer.claim
                && !first.state.has_claim(claim.claim_id)
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("claim by {} missing from winners", peer.name),
                });
            }
        }
        Ok(())
    }
}
