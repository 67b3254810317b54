//! CBOR-encoded sync messages.
//!
//! A message is the serde-tagged union
//! `{"type": "UPDATE_GAME" | "BINGO_CLAIM", "payload": {..}}` with camelCase
//! payload fields. CBOR keeps field names on the wire, so a peer can tell an
//! absent field from a present `null`, which [`GameUpdate`] relies on.
//!
//! # Invariants
//!
//! - Decoding never panics. Oversized input is rejected before the CBOR
//!   parser sees it.
//! - Encoding a message and decoding the bytes yields an equal message.

use std::fmt;

use bytes::{BufMut, Bytes};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{ProtocolError, Result};

/// Upper bound on inbound message size.
///
/// A full game state for a few hundred problems and winners fits in a few
/// kilobytes; anything this large is garbage.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Identity of a problem in the problem bank.
pub type ProblemId = u32;

/// Unique identifier of a bingo claim.
///
/// Generated randomly by the claiming peer. It is the dedup key for claims,
/// since two students may legitimately share a display name and a
/// millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub u64);

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// An accepted bingo declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinClaim {
    /// Dedup key.
    pub claim_id: ClaimId,
    /// Display name of the claiming student.
    pub name: String,
    /// Wall-clock milliseconds at the claiming peer.
    pub timestamp: u64,
}

impl WinClaim {
    /// Create a claim.
    pub fn new(claim_id: ClaimId, name: impl Into<String>, timestamp: u64) -> Self {
        Self { claim_id, name: name.into(), timestamp }
    }
}

/// Partial game state.
///
/// Each `Some` field overwrites the receiver's field; `None` leaves it
/// untouched. Sequences are replaced wholesale, never appended.
///
/// `current_problem_id` is doubly optional: `None` means "not part of this
/// update", `Some(None)` means "clear the current problem".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    /// Problem currently posted by the teacher.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub current_problem_id: Option<Option<ProblemId>>,

    /// Ids of posted problems, in posting order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ProblemId>>,

    /// Accepted bingo declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bingo_winners: Option<Vec<WinClaim>>,
}

impl GameUpdate {
    /// An update that touches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full update a confirmed reset publishes.
    pub fn reset() -> Self {
        Self {
            current_problem_id: Some(None),
            history: Some(Vec::new()),
            bingo_winners: Some(Vec::new()),
        }
    }

    /// Set the current problem (or clear it with `None`).
    #[must_use]
    pub fn with_current_problem(mut self, id: Option<ProblemId>) -> Self {
        self.current_problem_id = Some(id);
        self
    }

    /// Replace the history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<ProblemId>) -> Self {
        self.history = Some(history);
        self
    }

    /// Replace the winners list.
    #[must_use]
    pub fn with_winners(mut self, winners: Vec<WinClaim>) -> Self {
        self.bingo_winners = Some(winners);
        self
    }

    /// True if no field is present.
    pub fn is_empty(&self) -> bool {
        self.current_problem_id.is_none() && self.history.is_none() && self.bingo_winners.is_none()
    }
}

/// Marks a field as present even when its value is `null`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The unit published on the broadcast topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SyncMessage {
    /// Field-wise overwrite of the receiver's game state.
    #[serde(rename = "UPDATE_GAME")]
    UpdateGame(GameUpdate),

    /// A student declared bingo.
    #[serde(rename = "BINGO_CLAIM")]
    BingoClaim(WinClaim),
}

impl SyncMessage {
    /// Wire name of the variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UpdateGame(_) => "UPDATE_GAME",
            Self::BingoClaim(_) => "BINGO_CLAIM",
        }
    }

    /// Encode the message as CBOR into `dst`.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let mut writer = dst.writer();
        ciborium::ser::into_writer(self, &mut writer)
            .map_err(|e| ProtocolError::CborEncode(e.to_string()))
    }

    /// Encode the message into an owned buffer ready to publish.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Decode a message from raw bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MessageTooLarge` if `bytes` exceeds
    ///   [`MAX_MESSAGE_SIZE`]
    /// - `ProtocolError::CborDecode` on malformed CBOR, a wrong payload shape,
    ///   or an unknown variant
    /// - `ProtocolError::TrailingBytes` if anything follows the message
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: bytes.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        let mut remaining = bytes;
        let message = ciborium::de::from_reader(&mut remaining)
            .map_err(|e| ProtocolError::CborDecode(e.to_string()))?;

        if !remaining.is_empty() {
            return Err(ProtocolError::TrailingBytes { count: remaining.len() });
        }
        Ok(message)
    }
}
