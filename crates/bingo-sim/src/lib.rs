//! In-process classroom simulator.
//!
//! Runs a teacher and several autoplaying students over one
//! [`bingo_transport::BroadcastHub`] topic, each peer driven by the generic
//! [`bingo_app::Runtime`] on its own tokio task.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod autoplay;
mod bank;
mod env;
mod error;
mod session;

pub use autoplay::{AutoplayDriver, Plan};
pub use bank::demo_bank;
pub use env::PeerEnv;
pub use error::SimError;
pub use session::{ClassroomConfig, ClassroomReport, StudentReport, run_classroom, student_name};
