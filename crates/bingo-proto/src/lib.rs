//! Quiz-bingo sync protocol
//!
//! Wire types shared by every peer of a classroom game. There is no framing,
//! version field, or checksum: a message is a single CBOR value carrying one
//! of exactly two variants, [`SyncMessage::UpdateGame`] and
//! [`SyncMessage::BingoClaim`]. Adding a third variant is a breaking change
//! for all peers at once.
//!
//! # Components
//!
//! - [`SyncMessage`]: the unit published on the broadcast topic
//! - [`GameUpdate`]: partial game state (absent fields are left untouched)
//! - [`WinClaim`]: an accepted bingo declaration, keyed by [`ClaimId`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod message;

pub use errors::{ProtocolError, Result};
pub use message::{ClaimId, GameUpdate, MAX_MESSAGE_SIZE, ProblemId, SyncMessage, WinClaim};
