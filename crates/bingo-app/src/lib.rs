//! Peer sessions for quiz-bingo
//!
//! Pure teacher and student state machines plus a generic runtime, so the
//! same session code runs in production and in deterministic simulation.
//!
//! # Components
//!
//! - [`Peer`]: session state machine (identity, replica, role state)
//! - [`PeerEvent`] / [`PeerAction`]: inputs and instructions of the machine
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic event loop over a [`Driver`]
//! - [`SystemEnv`]: production [`Environment`] (system clock, OS randomness)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod driver;
mod error;
mod event;
mod peer;
mod runtime;
mod system_env;

pub use action::{Notice, PeerAction};
pub use bingo_core::env::Environment;
pub use driver::Driver;
pub use error::PeerError;
pub use event::PeerEvent;
pub use peer::{DEFAULT_TEACHER_NAME, Peer, PeerIdentity, Role};
pub use runtime::Runtime;
pub use system_env::SystemEnv;
