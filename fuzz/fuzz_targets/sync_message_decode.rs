//! Fuzz target for inbound message handling
//!
//! Arbitrary bytes go through `SyncMessage::decode` and straight into a
//! replica, as they would when a broadcast arrives.
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - Anything that decodes re-encodes to a message that decodes the same
//! - A replica stays well formed whatever it is fed: no duplicate history,
//!   current problem in history, winners sorted and unique

#![no_main]

use std::collections::HashSet;

use bingo_core::{Replica, SyncMessage, winner_order};
use bingo_harness::SimEnv;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = SyncMessage::decode(data) {
        let bytes = message.to_bytes().expect("decoded message re-encodes");
        let again = SyncMessage::decode(&bytes).expect("re-encoded message decodes");
        assert_eq!(again, message);
    }

    let mut replica = Replica::new(SimEnv::with_seed(0));
    let actions = replica.apply_remote_bytes(data);
    assert!(actions.len() <= 1, "remote input produced {} actions", actions.len());

    // Feed it twice: the second application must be a no-op.
    let actions = replica.apply_remote_bytes(data);
    assert!(actions.is_empty(), "remote input applied twice changed state");

    let state = replica.state();
    let mut seen = HashSet::new();
    assert!(state.history().iter().all(|id| seen.insert(*id)));
    if let Some(current) = state.current_problem_id() {
        assert!(state.is_posted(current));
    }
    assert!(
        state
            .bingo_winners()
            .windows(2)
            .all(|w| winner_order(&w[0], &w[1]) == std::cmp::Ordering::Less)
    );
});
