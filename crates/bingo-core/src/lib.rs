//! Quiz-bingo core
//!
//! Sans-IO logic shared by every peer: the replica of the shared game state,
//! the policy for merging inbound messages into it, and the per-student bingo
//! grid. Nothing here touches a clock, an RNG, or the network directly; time
//! and randomness come from an [`env::Environment`], and publishing is
//! returned to the caller as a [`ReplicaAction`].
//!
//! # Components
//!
//! - [`Replica`]: one peer's copy of [`GameState`], mutated locally and by
//!   inbound messages
//! - [`GameState`]: the shared state and its merge rules
//! - [`BingoGrid`]: grid generation, marking, and win detection
//! - [`ProblemBank`]: read-only problem source

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod error;
pub mod grid;
mod problem;
mod replica;
mod state;

pub use bingo_proto::{ClaimId, GameUpdate, ProblemId, SyncMessage, WinClaim};
pub use error::{BankError, GridError, StateError};
pub use grid::{BingoGrid, GridCell, WINNING_COMBINATIONS};
pub use problem::{Problem, ProblemBank, Topic};
pub use replica::{Replica, ReplicaAction};
pub use state::{GameState, winner_order};
