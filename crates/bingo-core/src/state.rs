//! Shared game state and its merge rules.
//!
//! Every peer holds an independent [`GameState`]; "sharing" is approximate
//! and achieved only through the rules here.
//!
//! # Merge policy
//!
//! - `UPDATE_GAME`: field-wise overwrite of whatever fields are present.
//!   Last writer wins per field, with no conflict detection, so peers agree
//!   only eventually (and not at all if delivery is lossy).
//! - `BINGO_CLAIM`: insert unless a claim with the same [`ClaimId`] is
//!   already present, then order by [`winner_order`]. Insertion is
//!   idempotent and commutative: any delivery order of the same claims
//!   produces the same list.
//!
//! # Invariants
//!
//! - `history` contains no duplicate id.
//! - `current_problem_id`, if set, appears in `history`.
//! - `bingo_winners` holds at most one claim per [`ClaimId`] and is sorted by
//!   [`winner_order`].
//!
//! An update that would break one of these is rejected as malformed and
//! leaves the state untouched.

use std::{cmp::Ordering, collections::HashSet};

use bingo_proto::{ClaimId, GameUpdate, ProblemId, WinClaim};

use crate::error::StateError;

/// Order of the winners list: most recent claim first, equal timestamps by
/// ascending claim id.
///
/// A total order over distinct claims, which is what makes the merge
/// independent of arrival order.
pub fn winner_order(a: &WinClaim, b: &WinClaim) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| a.claim_id.cmp(&b.claim_id))
}

/// The shared logical game state, as held by one peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    current_problem_id: Option<ProblemId>,
    history: Vec<ProblemId>,
    bingo_winners: Vec<WinClaim>,
}

impl GameState {
    /// Empty state: no problem posted, empty history, no winners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Problem currently posted by the teacher.
    pub fn current_problem_id(&self) -> Option<ProblemId> {
        self.current_problem_id
    }

    /// Posted problem ids, in posting order.
    pub fn history(&self) -> &[ProblemId] {
        &self.history
    }

    /// Accepted claims, ordered by [`winner_order`].
    pub fn bingo_winners(&self) -> &[WinClaim] {
        &self.bingo_winners
    }

    /// True if the problem has already been posted this game.
    pub fn is_posted(&self, id: ProblemId) -> bool {
        self.history.contains(&id)
    }

    /// True if a claim with this id has been accepted.
    pub fn has_claim(&self, claim_id: ClaimId) -> bool {
        self.bingo_winners.iter().any(|c| c.claim_id == claim_id)
    }

    /// Check that `update` can be applied without breaking an invariant.
    pub fn validate_update(&self, update: &GameUpdate) -> Result<(), StateError> {
        let history = update.history.as_deref().unwrap_or(&self.history);
        let current = update.current_problem_id.unwrap_or(self.current_problem_id);

        let mut seen = HashSet::with_capacity(history.len());
        for &id in history {
            if !seen.insert(id) {
                return Err(StateError::DuplicateHistoryEntry(id));
            }
        }

        if let Some(id) = current
            && !seen.contains(&id)
        {
            return Err(StateError::CurrentNotInHistory(id));
        }

        Ok(())
    }

    /// Overwrite the fields present in `update`.
    ///
    /// Returns `true` if the state changed. A present winners list is
    /// normalized (deduplicated by claim id and sorted) before it replaces
    /// the local one.
    pub fn apply_update(&mut self, update: &GameUpdate) -> Result<bool, StateError> {
        self.validate_update(update)?;

        let before = self.clone();
        if let Some(current) = update.current_problem_id {
            self.current_problem_id = current;
        }
        if let Some(history) = &update.history {
            self.history.clone_from(history);
        }
        if let Some(winners) = &update.bingo_winners {
            self.bingo_winners = normalize_winners(winners.iter().cloned());
        }

        debug_assert!(self.validate_update(&GameUpdate::new()).is_ok());
        Ok(*self != before)
    }

    /// Fold one claim into the winners list.
    ///
    /// Returns `false` if a claim with the same id was already present.
    pub fn merge_claim(&mut self, claim: WinClaim) -> bool {
        if self.has_claim(claim.claim_id) {
            return false;
        }

        let position = self
            .bingo_winners
            .partition_point(|existing| winner_order(existing, &claim) == Ordering::Less);
        self.bingo_winners.insert(position, claim);
        true
    }
}

/// Deduplicate by claim id (first occurrence wins) and sort.
fn normalize_winners(winners: impl IntoIterator<Item = WinClaim>) -> Vec<WinClaim> {
    let mut seen = HashSet::new();
    let mut result: Vec<_> = winners.into_iter().filter(|c| seen.insert(c.claim_id)).collect();
    result.sort_by(winner_order);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(id: u64, name: &str, timestamp: u64) -> WinClaim {
        WinClaim::new(ClaimId(id), name, timestamp)
    }

    fn posted(ids: &[ProblemId]) -> GameState {
        let mut state = GameState::new();
        let update =
            GameUpdate::new().with_current_problem(ids.last().copied()).with_history(ids.to_vec());
        state.apply_update(&update).expect("valid update");
        state
    }

    #[test]
    fn absent_fields_untouched() {
        let mut state = posted(&[4, 2]);
        state.merge_claim(claim(1, "Ana", 10));

        let changed = state.apply_update(&GameUpdate::new()).expect("empty update is valid");
        assert!(!changed);
        assert_eq!(state.history(), &[4, 2]);
        assert_eq!(state.current_problem_id(), Some(2));
        assert_eq!(state.bingo_winners().len(), 1);
    }

    #[test]
    fn history_replaced_wholesale() {
        let mut state = posted(&[4, 2]);
        let update = GameUpdate::new().with_current_problem(Some(9)).with_history(vec![9]);

        assert_eq!(state.apply_update(&update), Ok(true));
        assert_eq!(state.history(), &[9]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = posted(&[1, 2, 3]);
        state.merge_claim(claim(1, "Ana", 10));

        assert_eq!(state.apply_update(&GameUpdate::reset()), Ok(true));
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn duplicate_history_rejected() {
        let mut state = posted(&[1]);
        let update = GameUpdate::new().with_current_problem(Some(2)).with_history(vec![1, 2, 1]);

        assert_eq!(state.apply_update(&update), Err(StateError::DuplicateHistoryEntry(1)));
        assert_eq!(state, posted(&[1]));
    }

    #[test]
    fn current_outside_history_rejected() {
        let mut state = posted(&[1]);
        let update = GameUpdate::new().with_current_problem(Some(5));

        assert_eq!(state.apply_update(&update), Err(StateError::CurrentNotInHistory(5)));
        assert_eq!(state.current_problem_id(), Some(1));
    }

    #[test]
    fn winners_sorted_newest_first() {
        let mut state = GameState::new();
        assert!(state.merge_claim(claim(2, "Bob", 50)));
        assert!(state.merge_claim(claim(1, "Ana", 100)));

        let names: Vec<_> = state.bingo_winners().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bob"]);
    }

    #[test]
    fn duplicate_claim_ignored() {
        let mut state = GameState::new();
        assert!(state.merge_claim(claim(1, "Ana", 100)));
        assert!(!state.merge_claim(claim(1, "Ana", 100)));
        assert_eq!(state.bingo_winners().len(), 1);
    }

    #[test]
    fn same_name_different_claims_both_kept() {
        let mut state = GameState::new();
        assert!(state.merge_claim(claim(1, "Ana", 100)));
        assert!(state.merge_claim(claim(2, "Ana", 100)));
        assert_eq!(state.bingo_winners().len(), 2);
    }

    #[test]
    fn equal_timestamps_ordered_by_claim_id() {
        let mut a = GameState::new();
        a.merge_claim(claim(9, "Zed", 100));
        a.merge_claim(claim(3, "Ana", 100));

        let mut b = GameState::new();
        b.merge_claim(claim(3, "Ana", 100));
        b.merge_claim(claim(9, "Zed", 100));

        assert_eq!(a, b);
        assert_eq!(a.bingo_winners()[0].claim_id, ClaimId(3));
    }

    #[test]
    fn update_winners_are_normalized() {
        let mut state = GameState::new();
        let winners = vec![claim(1, "Old", 10), claim(2, "New", 20), claim(1, "Old", 10)];

        state.apply_update(&GameUpdate::new().with_winners(winners)).expect("valid update");

        let ids: Vec<_> = state.bingo_winners().iter().map(|c| c.claim_id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
