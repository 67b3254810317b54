//! Fuzz target for CBOR deserialization attacks on sync messages
//!
//! # Strategy
//!
//! - Deeply nested: arrays/maps nested inside the payload (stack overflow)
//! - Huge lengths: CBOR claiming massive byte/string/array lengths (memory)
//! - Oversized: well-formed messages past the size cap
//! - Type confusion: a known `type` tag with the other variant's payload
//! - Duplicate keys: envelopes repeating `type` or `payload`
//!
//! # Invariants
//!
//! - Decoding completes quickly (no infinite loops)
//! - Huge claimed lengths rejected, not allocated
//! - Messages past the cap rejected before parsing
//! - NEVER panic on malformed CBOR

#![no_main]

use arbitrary::Arbitrary;
use bingo_proto::{MAX_MESSAGE_SIZE, ProtocolError, SyncMessage};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum CborAttack {
    DeeplyNested { depth: u8, payload_type: PayloadType, tag: Tag },
    HugeLength { claimed_len_exponent: u8, tag: Tag },
    Oversized { extra: u16 },
    TypeConfusion { tag: Tag, payload: Vec<u8> },
    DuplicateKeys { count: u8 },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum PayloadType {
    Array,
    Map,
    Bytes,
    String,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Tag {
    UpdateGame,
    BingoClaim,
    Unknown,
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Self::UpdateGame => "UPDATE_GAME",
            Self::BingoClaim => "BINGO_CLAIM",
            Self::Unknown => "RESET_ALL",
        }
    }
}

fuzz_target!(|attack: CborAttack| {
    match attack {
        CborAttack::DeeplyNested { depth, payload_type, tag } => {
            let actual_depth = (depth % 50) as usize;
            let bytes = envelope(tag.name(), &create_nested_cbor(actual_depth, payload_type));
            let _ = SyncMessage::decode(&bytes);
        }

        CborAttack::HugeLength { claimed_len_exponent, tag } => {
            let exponent = u32::from(claimed_len_exponent % 21);
            let claimed_length = if exponent < 20 { 1u32 << exponent } else { u32::MAX };

            for payload in [
                create_huge_byte_string(claimed_length),
                create_huge_text_string(claimed_length),
                create_huge_array(claimed_length),
            ] {
                let _ = SyncMessage::decode(&envelope(tag.name(), &payload));
                let _ = SyncMessage::decode(&payload);
            }
        }

        CborAttack::Oversized { extra } => {
            // Valid claim whose name pushes it past the cap.
            let name_len = MAX_MESSAGE_SIZE + usize::from(extra);
            let mut payload = vec![0xA3];
            payload.extend(text("claimId"));
            payload.push(0x01);
            payload.extend(text(&"x".repeat(name_len)));
            payload.extend(text("timestamp"));
            payload.push(0x01);

            let bytes = envelope("BINGO_CLAIM", &payload);
            assert!(matches!(
                SyncMessage::decode(&bytes),
                Err(ProtocolError::MessageTooLarge { .. })
            ));
        }

        CborAttack::TypeConfusion { tag, payload } => {
            let _ = SyncMessage::decode(&envelope(tag.name(), &payload));
        }

        CborAttack::DuplicateKeys { count } => {
            let actual_count = (count % 10).max(2);
            let mut bytes = vec![0xA0 | actual_count];
            for _ in 0..actual_count {
                bytes.extend(text("type"));
                bytes.extend(text("UPDATE_GAME"));
            }
            let _ = SyncMessage::decode(&bytes);
        }
    }
});

/// `{"type": tag, "payload": <payload>}`
fn envelope(tag: &str, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xA2];
    bytes.extend(text("type"));
    bytes.extend(text(tag));
    bytes.extend(text("payload"));
    bytes.extend_from_slice(payload);
    bytes
}

/// Definite-length CBOR text string.
fn text(s: &str) -> Vec<u8> {
    let len = s.len();
    let mut bytes = if len < 24 {
        vec![0x60 | len as u8]
    } else if len <= usize::from(u8::MAX) {
        vec![0x78, len as u8]
    } else if len <= usize::from(u16::MAX) {
        let mut header = vec![0x79];
        header.extend_from_slice(&(len as u16).to_be_bytes());
        header
    } else {
        let mut header = vec![0x7A];
        header.extend_from_slice(&(len as u32).to_be_bytes());
        header
    };
    bytes.extend_from_slice(s.as_bytes());
    bytes
}

fn create_nested_cbor(depth: usize, payload_type: PayloadType) -> Vec<u8> {
    let mut bytes = Vec::new();

    match payload_type {
        PayloadType::Array => {
            bytes.extend(std::iter::repeat_n(0x81, depth));
            bytes.push(0x01);
        }
        PayloadType::Map => {
            for _ in 0..depth {
                bytes.extend([0xA1, 0x61, b'a']);
            }
            bytes.push(0x01);
        }
        PayloadType::Bytes => {
            bytes.extend(std::iter::repeat_n(0x81, depth));
            bytes.extend([0x41, 0x00]);
        }
        PayloadType::String => {
            bytes.extend(std::iter::repeat_n(0x81, depth));
            bytes.extend([0x61, b'x']);
        }
    }

    bytes
}

fn create_huge_byte_string(claimed_length: u32) -> Vec<u8> {
    let mut bytes = vec![0x5A];
    bytes.extend_from_slice(&claimed_length.to_be_bytes());
    bytes.extend(vec![0xAA; (claimed_length as usize).min(10)]);
    bytes
}

fn create_huge_text_string(claimed_length: u32) -> Vec<u8> {
    let mut bytes = vec![0x7A];
    bytes.extend_from_slice(&claimed_length.to_be_bytes());
    bytes.extend(vec![b'x'; (claimed_length as usize).min(10)]);
    bytes
}

fn create_huge_array(claimed_length: u32) -> Vec<u8> {
    let mut bytes = vec![0x9A];
    bytes.extend_from_slice(&claimed_length.to_be_bytes());
    for _ in 0..(claimed_length as usize).min(5) {
        bytes.push(0x01);
    }
    bytes
}
