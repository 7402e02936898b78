//! Byte-level codec for the 2-byte event packets.
//!
//! Wire format:
//! ```text
//! [high:1][low:1]    one packet per event, no header, no length prefix
//! ```
//!
//! [`encode_event`] and [`decode_packet`] handle a single packet.
//! [`PacketStreamDecoder`] is the receiver's view: it accepts the byte stream
//! in arbitrary chunks and yields one event per complete packet.

use std::collections::VecDeque;

use thiserror::Error;

use crate::domain::diff::SemanticEvent;
use crate::protocol::packet::{WirePacket, PACKET_SIZE};

/// Errors that can occur while decoding packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than one packet.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// Bits 15–13 match neither the key nor the modifier start marker.
    #[error("unknown start marker: 0b{0:03b}")]
    UnknownStartMarker(u8),

    /// Bits 3–1 do not match the stop marker for the packet kind.
    #[error("stop marker mismatch: expected 0b{expected:03b}, found 0b{found:03b}")]
    StopMarkerMismatch { expected: u8, found: u8 },

    /// A key packet's bit 0 disagrees with its press/release bit.
    #[error("verification bit mismatch: press bit {flag}, verification bit {verification}")]
    VerificationMismatch { flag: bool, verification: bool },

    /// A modifier packet has one of its unused bits (12 or 0) set.
    #[error("reserved bits set in modifier packet 0x{0:04X}")]
    ReservedBitsSet(u16),

    /// A key packet carries key code 0, which denotes "no key".
    #[error("key packet carries key code 0")]
    ZeroKeyCode,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `event` as `[high, low]`.
///
/// # Examples
///
/// ```rust
/// use hid_bridge_core::{encode_event, decode_packet, SemanticEvent};
///
/// let event = SemanticEvent::KeyPressed { code: 0x04 };
/// let bytes = encode_event(&event);
/// assert_eq!(bytes, [0xB0, 0x47]);
/// let (decoded, consumed) = decode_packet(&bytes).unwrap();
/// assert_eq!(decoded, event);
/// assert_eq!(consumed, 2);
/// ```
pub fn encode_event(event: &SemanticEvent) -> [u8; PACKET_SIZE] {
    WirePacket::from_event(event).to_be_bytes()
}

/// Decodes one packet from the beginning of `bytes`.
///
/// Returns the event and the number of bytes consumed (always
/// [`PACKET_SIZE`]), so the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] for fewer than two bytes, or
/// the validation error from [`WirePacket::to_event`].
pub fn decode_packet(bytes: &[u8]) -> Result<(SemanticEvent, usize), ProtocolError> {
    if bytes.len() < PACKET_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: PACKET_SIZE,
            available: bytes.len(),
        });
    }
    let packet = WirePacket::from_be_bytes([bytes[0], bytes[1]]);
    Ok((packet.to_event()?, PACKET_SIZE))
}

// ── Stream decoding ───────────────────────────────────────────────────────────

/// Reassembles a chunked byte stream into events.
///
/// The link has no resynchronisation mechanism of its own.  When a packet
/// fails validation the decoder reports the error and discards only the
/// first byte, so a receiver that started listening mid-packet re-aligns
/// on the next valid packet instead of staying one byte off forever.
#[derive(Debug, Default)]
pub struct PacketStreamDecoder {
    pending: VecDeque<u8>,
}

impl PacketStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().copied());
    }

    /// Number of buffered bytes not yet decoded.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Decodes the next buffered packet.
    ///
    /// Returns `None` when fewer than two bytes are buffered.
    pub fn next_event(&mut self) -> Option<Result<SemanticEvent, ProtocolError>> {
        if self.pending.len() < PACKET_SIZE {
            return None;
        }
        let packet = WirePacket::from_be_bytes([self.pending[0], self.pending[1]]);
        match packet.to_event() {
            Ok(event) => {
                self.pending.drain(..PACKET_SIZE);
                Some(Ok(event))
            }
            Err(e) => {
                self.pending.pop_front();
                Some(Err(e))
            }
        }
    }
}

impl Iterator for PacketStreamDecoder {
    type Item = Result<SemanticEvent, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
