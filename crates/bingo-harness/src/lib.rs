//! Deterministic simulation harness for quiz-bingo.
//!
//! Seeded implementations of the environment and the broadcast network, so
//! whole classrooms replay exactly from a seed.
//!
//! # Classroom Simulation
//!
//! [`Classroom`] wires real [`bingo_app::Peer`]s to a [`SimNetwork`] that
//! preserves per-sender order, interleaves senders at random, and can drop
//! copies. Generated [`Operation`]s drive it.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks WHAT must be true across all execution
//! paths, not specific scenarios. Use [`InvariantRegistry::standard()`] after
//! every step.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classroom;
pub mod invariants;
pub mod operation;
pub mod sim_env;
pub mod sim_network;

pub use classroom::{Classroom, TEACHER};
pub use invariants::{
    ClaimsBackedByBingo, CurrentInHistory, HistoryUnique, Invariant, InvariantRegistry,
    InvariantResult, PeerSnapshot, ProblemConvergence, SystemSnapshot, Violation,
    WinnerConvergence, WinnersOrdered,
};
pub use operation::{Operation, StudentSlot};
pub use sim_env::{START_MILLIS, SimEnv};
pub use sim_network::{Delivery, NetworkConfig, NetworkStats, PeerId, SimNetwork};
