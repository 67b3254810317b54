//! Fuzz target for whole classrooms
//!
//! Arbitrary operation sequences drive a teacher and three students over a
//! lossless simulated network. Every standard invariant is checked after
//! every operation and once more after the network drains.
//!
//! # Invariants
//!
//! - Replica state stays well formed on every peer
//! - Claims are always backed by a frozen winning grid
//! - Once drained, every peer agrees with the teacher

#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use bingo_core::{Problem, ProblemBank, Topic};
use bingo_harness::{Classroom, InvariantRegistry, NetworkConfig, Operation};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    seed: u64,
    ops: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let problems = (1..=24)
        .map(|id| Problem::new(id, format!("q{id}"), format!("a{id}"), Topic::RatioDivide))
        .collect();
    let bank = Arc::new(ProblemBank::new(problems).expect("unique ids"));

    let registry = InvariantRegistry::standard();
    let mut room = Classroom::new(input.seed, bank, &["Ana", "Bob", "Cy"], NetworkConfig::lossless())
        .expect("classroom");

    for op in input.ops.iter().take(256) {
        room.apply(op);
        registry.assert_all(&room.snapshot(), op.name());
    }

    room.run_until_quiet(100_000);
    registry.assert_all(&room.snapshot(), "after drain");
});
