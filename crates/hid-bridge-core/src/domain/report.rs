//! HID input report snapshots.
//!
//! A USB keyboard in boot protocol sends an 8-byte report every polling
//! interval:
//!
//! ```text
//! [modifiers:1][reserved:1][keycode0..keycode5:6]
//! ```
//!
//! `modifiers` is a bitmask (one bit per Ctrl/Shift/Alt/GUI key on each
//! side).  The six keycode slots hold the HID usage IDs of the non-modifier
//! keys currently held; `0` marks an empty slot.  Slot order is arbitrary and
//! carries no meaning.
//!
//! A boot-protocol mouse sends `[buttons][x][y]` followed by optional
//! `[wheel][pan]` bytes, each axis a signed 8-bit relative delta.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of simultaneously held non-modifier keys a boot keyboard reports.
pub const KEY_SLOTS: usize = 6;

/// Size of a boot-protocol keyboard report in bytes.
pub const KEYBOARD_REPORT_LEN: usize = 8;

/// Minimum size of a boot-protocol mouse report in bytes.
pub const MOUSE_REPORT_MIN_LEN: usize = 3;

/// Errors produced while parsing raw report bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The report is shorter than its fixed layout requires.
    #[error("report too short: need at least {needed} bytes, got {available}")]
    TooShort { needed: usize, available: usize },
}

// ── Modifier mask ─────────────────────────────────────────────────────────────

/// The 8-bit modifier byte of a keyboard report.
///
/// The differ treats this as an opaque byte; the bit constants exist for
/// callers that build reports and for log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierMask(pub u8);

impl ModifierMask {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_GUI: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_GUI: u8 = 1 << 7;

    const NAMES: [&'static str; 8] = [
        "LCtrl", "LShift", "LAlt", "LGui", "RCtrl", "RShift", "RAlt", "RGui",
    ];

    /// Returns the raw byte.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when no modifier is held.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit in `flags` is set.
    pub fn contains(self, flags: u8) -> bool {
        self.0 & flags == flags
    }
}

impl fmt::Display for ModifierMask {
    /// Renders held modifiers as `LCtrl+LShift`, or `none`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (bit, name) in Self::NAMES.iter().enumerate() {
            if self.0 & (1 << bit) != 0 {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// ── Keyboard report ───────────────────────────────────────────────────────────

/// A snapshot of keyboard state at one polling instant.
///
/// `keycodes` is a multiset: the same non-zero code may legally occupy more
/// than one slot (a device artifact).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyboardReport {
    pub modifiers: ModifierMask,
    pub keycodes: [u8; KEY_SLOTS],
}

impl KeyboardReport {
    /// Creates a report from a modifier byte and six keycode slots.
    pub fn new(modifiers: u8, keycodes: [u8; KEY_SLOTS]) -> Self {
        Self {
            modifiers: ModifierMask(modifiers),
            keycodes,
        }
    }

    /// Parses a boot-protocol keyboard report.
    ///
    /// The reserved byte and any bytes past the eighth are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::TooShort`] when fewer than 8 bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        if bytes.len() < KEYBOARD_REPORT_LEN {
            return Err(ReportError::TooShort {
                needed: KEYBOARD_REPORT_LEN,
                available: bytes.len(),
            });
        }
        let mut keycodes = [0u8; KEY_SLOTS];
        keycodes.copy_from_slice(&bytes[2..KEYBOARD_REPORT_LEN]);
        Ok(Self::new(bytes[0], keycodes))
    }

    /// Serializes back to the 8-byte boot layout with a zero reserved byte.
    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_LEN] {
        let mut out = [0u8; KEYBOARD_REPORT_LEN];
        out[0] = self.modifiers.0;
        out[2..].copy_from_slice(&self.keycodes);
        out
    }

    /// Returns `true` if `code` occupies any slot.  Zero is never "held".
    pub fn contains(&self, code: u8) -> bool {
        code != 0 && self.keycodes.contains(&code)
    }

    /// Number of slots holding `code`.
    pub fn occurrences(&self, code: u8) -> usize {
        if code == 0 {
            return 0;
        }
        self.keycodes.iter().filter(|&&c| c == code).count()
    }

    /// Iterates the non-zero slots in slot order.
    pub fn held_keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.keycodes.iter().copied().filter(|&c| c != 0)
    }
}

// ── Mouse report ──────────────────────────────────────────────────────────────

/// A boot-protocol mouse report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseReport {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
    pub pan: i8,
}

impl MouseReport {
    pub const BUTTON_LEFT: u8 = 1 << 0;
    pub const BUTTON_RIGHT: u8 = 1 << 1;
    pub const BUTTON_MIDDLE: u8 = 1 << 2;

    /// Parses a mouse report; `wheel` and `pan` default to 0 when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::TooShort`] when fewer than 3 bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        if bytes.len() < MOUSE_REPORT_MIN_LEN {
            return Err(ReportError::TooShort {
                needed: MOUSE_REPORT_MIN_LEN,
                available: bytes.len(),
            });
        }
        let signed = |i: usize| bytes.get(i).map_or(0, |&b| b as i8);
        Ok(Self {
            buttons: bytes[0],
            x: signed(1),
            y: signed(2),
            wheel: signed(3),
            pan: signed(4),
        })
    }
}

// ── Interface protocol ────────────────────────────────────────────────────────

/// HID boot interface protocol reported by a mounted interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceProtocol {
    None,
    Keyboard,
    Mouse,
}

impl From<u8> for InterfaceProtocol {
    fn from(value: u8) -> Self {
        match value {
            1 => InterfaceProtocol::Keyboard,
            2 => InterfaceProtocol::Mouse,
            _ => InterfaceProtocol::None,
        }
    }
}

impl fmt::Display for InterfaceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterfaceProtocol::None => "None",
            InterfaceProtocol::Keyboard => "Keyboard",
            InterfaceProtocol::Mouse => "Mouse",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keyboard_report_is_all_zero() {
        let report = KeyboardReport::default();
        assert_eq!(report.modifiers.bits(), 0);
        assert_eq!(report.keycodes, [0; KEY_SLOTS]);
        assert_eq!(report.held_keys().count(), 0);
    }

    #[test]
    fn test_from_bytes_skips_reserved_byte() {
        // Arrange
        let bytes = [0x02, 0xFF, 0x04, 0x05, 0, 0, 0, 0];

        // Act
        let report = KeyboardReport::from_bytes(&bytes).expect("8 bytes must parse");

        // Assert
        assert_eq!(report.modifiers, ModifierMask(ModifierMask::LEFT_SHIFT));
        assert_eq!(report.keycodes, [0x04, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn test_from_bytes_ignores_trailing_bytes() {
        let bytes = [0, 0, 0x29, 0, 0, 0, 0, 0, 0xAA, 0xBB];
        let report = KeyboardReport::from_bytes(&bytes).unwrap();
        assert_eq!(report.keycodes[0], 0x29);
    }

    #[test]
    fn test_from_bytes_rejects_short_report() {
        let result = KeyboardReport::from_bytes(&[0, 0, 4]);
        assert_eq!(
            result,
            Err(ReportError::TooShort {
                needed: KEYBOARD_REPORT_LEN,
                available: 3
            })
        );
    }

    #[test]
    fn test_to_bytes_zeroes_reserved_byte() {
        let report = KeyboardReport::new(0x11, [0x04, 0, 0, 0, 0, 0x05]);
        assert_eq!(report.to_bytes(), [0x11, 0, 0x04, 0, 0, 0, 0, 0x05]);
    }

    #[test]
    fn test_contains_never_matches_zero() {
        let report = KeyboardReport::new(0, [0x04, 0, 0, 0, 0, 0]);
        assert!(report.contains(0x04));
        assert!(!report.contains(0));
        assert!(!report.contains(0x05));
    }

    #[test]
    fn test_occurrences_counts_duplicate_slots() {
        let report = KeyboardReport::new(0, [0x04, 0x04, 0x05, 0, 0, 0]);
        assert_eq!(report.occurrences(0x04), 2);
        assert_eq!(report.occurrences(0x05), 1);
        assert_eq!(report.occurrences(0), 0);
    }

    #[test]
    fn test_held_keys_preserves_slot_order() {
        let report = KeyboardReport::new(0, [0, 0x07, 0, 0x04, 0x05, 0]);
        let held: Vec<u8> = report.held_keys().collect();
        assert_eq!(held, vec![0x07, 0x04, 0x05]);
    }

    #[test]
    fn test_modifier_mask_display_lists_held_modifiers() {
        let mask = ModifierMask(ModifierMask::LEFT_CTRL | ModifierMask::RIGHT_ALT);
        assert_eq!(mask.to_string(), "LCtrl+RAlt");
        assert_eq!(ModifierMask(0).to_string(), "none");
    }

    #[test]
    fn test_modifier_mask_contains() {
        let mask = ModifierMask(0x03);
        assert!(mask.contains(ModifierMask::LEFT_CTRL));
        assert!(mask.contains(ModifierMask::LEFT_CTRL | ModifierMask::LEFT_SHIFT));
        assert!(!mask.contains(ModifierMask::LEFT_ALT));
    }

    #[test]
    fn test_mouse_report_parses_signed_deltas() {
        let report = MouseReport::from_bytes(&[0x01, 0xFB, 0x0A, 0xFF]).unwrap();
        assert_eq!(report.buttons, MouseReport::BUTTON_LEFT);
        assert_eq!(report.x, -5);
        assert_eq!(report.y, 10);
        assert_eq!(report.wheel, -1);
        assert_eq!(report.pan, 0);
    }

    #[test]
    fn test_mouse_report_rejects_two_bytes() {
        assert!(matches!(
            MouseReport::from_bytes(&[0, 1]),
            Err(ReportError::TooShort { needed: 3, available: 2 })
        ));
    }

    #[test]
    fn test_interface_protocol_from_byte() {
        assert_eq!(InterfaceProtocol::from(0), InterfaceProtocol::None);
        assert_eq!(InterfaceProtocol::from(1), InterfaceProtocol::Keyboard);
        assert_eq!(InterfaceProtocol::from(2), InterfaceProtocol::Mouse);
        assert_eq!(InterfaceProtocol::from(9), InterfaceProtocol::None);
    }
}
