//! The 16-bit wire packet.
//!
//! Every [`SemanticEvent`] becomes exactly one packet, transmitted as two
//! bytes, high byte first.  Bit 15 is the most significant bit.
//!
//! Key event packet:
//!
//! ```text
//!  15 14 13 | 12    | 11 .. 4  | 3 2 1 | 0
//!  1  0  1  | press | key code | 0 1 1 | press (verification copy)
//! ```
//!
//! Modifier event packet:
//!
//! ```text
//!  15 14 13 | 12 | 11 .. 4       | 3 2 1 | 0
//!  1  1  0  | 0  | modifier mask | 0 1 0 | 0
//! ```
//!
//! The 3-bit start and stop markers are the only framing: there is no length
//! prefix, checksum, or escape sequence.
//!
//! [`SemanticEvent`]: crate::domain::diff::SemanticEvent

use crate::domain::diff::SemanticEvent;
use crate::domain::report::ModifierMask;
use crate::protocol::codec::ProtocolError;

/// Size of one packet on the wire in bytes.
pub const PACKET_SIZE: usize = 2;

/// Start marker (bits 15–13) of a key event packet.
pub const KEY_START_MARKER: u8 = 0b101;
/// Stop marker (bits 3–1) of a key event packet.
pub const KEY_STOP_MARKER: u8 = 0b011;
/// Start marker (bits 15–13) of a modifier event packet.
pub const MODIFIER_START_MARKER: u8 = 0b110;
/// Stop marker (bits 3–1) of a modifier event packet.
pub const MODIFIER_STOP_MARKER: u8 = 0b010;

const START_SHIFT: u16 = 13;
const FLAG_SHIFT: u16 = 12;
const PAYLOAD_SHIFT: u16 = 4;
const STOP_SHIFT: u16 = 1;

/// Packet kind, identified purely by the start marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Key,
    Modifier,
}

impl PacketKind {
    /// The stop marker a well-formed packet of this kind carries.
    pub fn stop_marker(self) -> u8 {
        match self {
            PacketKind::Key => KEY_STOP_MARKER,
            PacketKind::Modifier => MODIFIER_STOP_MARKER,
        }
    }
}

/// A 16-bit packet value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WirePacket(pub u16);

impl WirePacket {
    /// Builds the packet for `event`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hid_bridge_core::{SemanticEvent, WirePacket};
    ///
    /// let packet = WirePacket::from_event(&SemanticEvent::KeyPressed { code: 0x04 });
    /// assert_eq!(packet.0, 0xB047);
    /// assert_eq!(packet.to_be_bytes(), [0xB0, 0x47]);
    /// ```
    pub fn from_event(event: &SemanticEvent) -> Self {
        match *event {
            SemanticEvent::KeyPressed { code } => Self::key(true, code),
            SemanticEvent::KeyReleased { code } => Self::key(false, code),
            SemanticEvent::ModifierChanged { new_mask } => {
                let mut packet = 0u16;
                packet |= (MODIFIER_START_MARKER as u16) << START_SHIFT;
                packet |= (new_mask.bits() as u16) << PAYLOAD_SHIFT;
                packet |= (MODIFIER_STOP_MARKER as u16) << STOP_SHIFT;
                WirePacket(packet)
            }
        }
    }

    fn key(pressed: bool, code: u8) -> Self {
        let press = pressed as u16;
        let mut packet = 0u16;
        packet |= (KEY_START_MARKER as u16) << START_SHIFT;
        packet |= press << FLAG_SHIFT;
        packet |= (code as u16) << PAYLOAD_SHIFT;
        packet |= (KEY_STOP_MARKER as u16) << STOP_SHIFT;
        packet |= press;
        WirePacket(packet)
    }

    /// Splits into `[high, low]`.
    pub fn to_be_bytes(self) -> [u8; PACKET_SIZE] {
        self.0.to_be_bytes()
    }

    /// Joins `[high, low]`.
    pub fn from_be_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        WirePacket(u16::from_be_bytes(bytes))
    }

    /// Bits 15–13.
    pub fn start_marker(self) -> u8 {
        (self.0 >> START_SHIFT) as u8 & 0b111
    }

    /// Bit 12: press/release for key packets, unused for modifier packets.
    pub fn flag_bit(self) -> bool {
        (self.0 >> FLAG_SHIFT) & 1 == 1
    }

    /// Bits 11–4: the key code or modifier mask.
    pub fn payload(self) -> u8 {
        (self.0 >> PAYLOAD_SHIFT) as u8
    }

    /// Bits 3–1.
    pub fn stop_marker(self) -> u8 {
        (self.0 >> STOP_SHIFT) as u8 & 0b111
    }

    /// Bit 0: copy of bit 12 for key packets, unused for modifier packets.
    pub fn verification_bit(self) -> bool {
        self.0 & 1 == 1
    }

    /// Classifies the packet by its start marker.
    pub fn kind(self) -> Option<PacketKind> {
        match self.start_marker() {
            KEY_START_MARKER => Some(PacketKind::Key),
            MODIFIER_START_MARKER => Some(PacketKind::Modifier),
            _ => None,
        }
    }

    /// Receiver-side decode with full validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when the start marker is unknown, the stop
    /// marker does not match the kind, a key packet's verification bit
    /// disagrees with its press bit, a modifier packet has bit 12 or bit 0
    /// set, or a key packet carries code 0.
    pub fn to_event(self) -> Result<SemanticEvent, ProtocolError> {
        let kind = self
            .kind()
            .ok_or(ProtocolError::UnknownStartMarker(self.start_marker()))?;

        let expected = kind.stop_marker();
        if self.stop_marker() != expected {
            return Err(ProtocolError::StopMarkerMismatch {
                expected,
                found: self.stop_marker(),
            });
        }

        match kind {
            PacketKind::Key => {
                if self.flag_bit() != self.verification_bit() {
                    return Err(ProtocolError::VerificationMismatch {
                        flag: self.flag_bit(),
                        verification: self.verification_bit(),
                    });
                }
                let code = self.payload();
                if code == 0 {
                    return Err(ProtocolError::ZeroKeyCode);
                }
                Ok(if self.flag_bit() {
                    SemanticEvent::KeyPressed { code }
                } else {
                    SemanticEvent::KeyReleased { code }
                })
            }
            PacketKind::Modifier => {
                if self.flag_bit() || self.verification_bit() {
                    return Err(ProtocolError::ReservedBitsSet(self.0));
                }
                Ok(SemanticEvent::ModifierChanged {
                    new_mask: ModifierMask(self.payload()),
                })
            }
        }
    }
}

impl From<&SemanticEvent> for WirePacket {
    fn from(event: &SemanticEvent) -> Self {
        WirePacket::from_event(event)
    }
}

impl TryFrom<WirePacket> for SemanticEvent {
    type Error = ProtocolError;

    fn try_from(packet: WirePacket) -> Result<Self, Self::Error> {
        packet.to_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pressed_a_fields() {
        // Arrange / Act
        let packet = WirePacket::from_event(&SemanticEvent::KeyPressed { code: 0x04 });

        // Assert
        assert_eq!(packet.start_marker(), 0b101);
        assert!(packet.flag_bit());
        assert_eq!(packet.payload(), 0x04);
        assert_eq!(packet.stop_marker(), 0b011);
        assert!(packet.verification_bit());
        assert_eq!(packet.0, 0b1011_0000_0100_0111);
    }

    #[test]
    fn test_key_released_a_fields() {
        let packet = WirePacket::from_event(&SemanticEvent::KeyReleased { code: 0x04 });

        assert_eq!(packet.start_marker(), 0b101);
        assert!(!packet.flag_bit());
        assert_eq!(packet.payload(), 0x04);
        assert_eq!(packet.stop_marker(), 0b011);
        assert!(!packet.verification_bit());
        assert_eq!(packet.to_be_bytes(), [0xA0, 0x46]);
    }

    #[test]
    fn test_modifier_packet_fields() {
        let packet = WirePacket::from_event(&SemanticEvent::ModifierChanged {
            new_mask: ModifierMask(0xFF),
        });

        assert_eq!(packet.start_marker(), 0b110);
        assert!(!packet.flag_bit());
        assert_eq!(packet.payload(), 0xFF);
        assert_eq!(packet.stop_marker(), 0b010);
        assert!(!packet.verification_bit());
        assert_eq!(packet.to_be_bytes(), [0xCF, 0xF4]);
    }

    #[test]
    fn test_empty_modifier_mask_packet() {
        let packet = WirePacket::from_event(&SemanticEvent::ModifierChanged {
            new_mask: ModifierMask(0),
        });
        assert_eq!(packet.to_be_bytes(), [0xC0, 0x04]);
    }

    #[test]
    fn test_kinds_are_distinguished_by_start_marker() {
        let key = WirePacket::from_event(&SemanticEvent::KeyReleased { code: 0xFF });
        let modifier = WirePacket::from_event(&SemanticEvent::ModifierChanged {
            new_mask: ModifierMask(0xFF),
        });
        assert_eq!(key.kind(), Some(PacketKind::Key));
        assert_eq!(modifier.kind(), Some(PacketKind::Modifier));
        assert_eq!(WirePacket(0x0000).kind(), None);
    }

    #[test]
    fn test_to_event_recovers_every_key_code() {
        for code in 1..=u8::MAX {
            for event in [
                SemanticEvent::KeyPressed { code },
                SemanticEvent::KeyReleased { code },
            ] {
                assert_eq!(WirePacket::from_event(&event).to_event(), Ok(event));
            }
        }
    }

    #[test]
    fn test_to_event_rejects_unknown_start_marker() {
        assert_eq!(
            WirePacket(0b0110_0000_0100_0111).to_event(),
            Err(ProtocolError::UnknownStartMarker(0b011))
        );
    }

    #[test]
    fn test_to_event_rejects_key_packet_with_modifier_stop_marker() {
        let packet = WirePacket(0b1011_0000_0100_0101);
        assert_eq!(
            packet.to_event(),
            Err(ProtocolError::StopMarkerMismatch {
                expected: KEY_STOP_MARKER,
                found: MODIFIER_STOP_MARKER
            })
        );
    }

    #[test]
    fn test_to_event_rejects_verification_mismatch() {
        // press bit set, verification bit clear
        let packet = WirePacket(0b1011_0000_0100_0110);
        assert_eq!(
            packet.to_event(),
            Err(ProtocolError::VerificationMismatch {
                flag: true,
                verification: false
            })
        );
    }

    #[test]
    fn test_to_event_rejects_modifier_packet_with_reserved_bits() {
        let packet = WirePacket(0b1101_0000_0000_0100);
        assert_eq!(packet.to_event(), Err(ProtocolError::ReservedBitsSet(packet.0)));
    }

    #[test]
    fn test_to_event_rejects_zero_key_code() {
        let packet = WirePacket(0b1011_0000_0000_0111);
        assert_eq!(packet.to_event(), Err(ProtocolError::ZeroKeyCode));
    }
}
