//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! Reference: USB HID Usage Tables 1.3, Section 10.
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The USB HID standard assigns a number to every key *position*:
//!
//! | Key          | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Enter        | 0x28        |
//! | Left Ctrl    | 0xE0        |
//!
//! Letters start at 0x04, not at ASCII 'A' (0x41), because the code names a
//! physical key, not a character.  What character the key produces depends
//! on the layout configured on the receiving side, which is why the bridge
//! forwards usage IDs untouched.
//!
//! Usages 0x01–0x03 are error indications (rollover, POST fail, undefined)
//! rather than keys; they are named here so they stand out in logs.

use std::fmt;

const LETTERS: [&str; 26] = [
    "KeyA", "KeyB", "KeyC", "KeyD", "KeyE", "KeyF", "KeyG", "KeyH", "KeyI", "KeyJ", "KeyK",
    "KeyL", "KeyM", "KeyN", "KeyO", "KeyP", "KeyQ", "KeyR", "KeyS", "KeyT", "KeyU", "KeyV",
    "KeyW", "KeyX", "KeyY", "KeyZ",
];

const DIGITS: [&str; 10] = [
    "Digit1", "Digit2", "Digit3", "Digit4", "Digit5", "Digit6", "Digit7", "Digit8", "Digit9",
    "Digit0",
];

const FUNCTION_KEYS: [&str; 12] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
];

const KEYPAD_DIGITS: [&str; 10] = [
    "Numpad1", "Numpad2", "Numpad3", "Numpad4", "Numpad5", "Numpad6", "Numpad7", "Numpad8",
    "Numpad9", "Numpad0",
];

const MODIFIER_KEYS: [&str; 8] = [
    "ControlLeft",
    "ShiftLeft",
    "AltLeft",
    "MetaLeft",
    "ControlRight",
    "ShiftRight",
    "AltRight",
    "MetaRight",
];

/// Returns the conventional name of a keyboard-page usage, if it has one.
///
/// Returns `None` for 0x00 (no key) and for usages without a common name.
pub fn usage_name(code: u8) -> Option<&'static str> {
    let name = match code {
        0x01 => "ErrorRollOver",
        0x02 => "PostFail",
        0x03 => "ErrorUndefined",
        0x04..=0x1D => LETTERS[(code - 0x04) as usize],
        0x1E..=0x27 => DIGITS[(code - 0x1E) as usize],
        0x28 => "Enter",
        0x29 => "Escape",
        0x2A => "Backspace",
        0x2B => "Tab",
        0x2C => "Space",
        0x2D => "Minus",
        0x2E => "Equal",
        0x2F => "BracketLeft",
        0x30 => "BracketRight",
        0x31 => "Backslash",
        0x32 => "IntlHash",
        0x33 => "Semicolon",
        0x34 => "Quote",
        0x35 => "Backquote",
        0x36 => "Comma",
        0x37 => "Period",
        0x38 => "Slash",
        0x39 => "CapsLock",
        0x3A..=0x45 => FUNCTION_KEYS[(code - 0x3A) as usize],
        0x46 => "PrintScreen",
        0x47 => "ScrollLock",
        0x48 => "Pause",
        0x49 => "Insert",
        0x4A => "Home",
        0x4B => "PageUp",
        0x4C => "Delete",
        0x4D => "End",
        0x4E => "PageDown",
        0x4F => "ArrowRight",
        0x50 => "ArrowLeft",
        0x51 => "ArrowDown",
        0x52 => "ArrowUp",
        0x53 => "NumLock",
        0x54 => "NumpadDivide",
        0x55 => "NumpadMultiply",
        0x56 => "NumpadSubtract",
        0x57 => "NumpadAdd",
        0x58 => "NumpadEnter",
        0x59..=0x62 => KEYPAD_DIGITS[(code - 0x59) as usize],
        0x63 => "NumpadDecimal",
        0x64 => "IntlBackslash",
        0x65 => "ContextMenu",
        0xE0..=0xE7 => MODIFIER_KEYS[(code - 0xE0) as usize],
        _ => return None,
    };
    Some(name)
}

/// Display adapter rendering a usage as `KeyA (0x04)`, or `0x87` when the
/// usage has no name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyName(pub u8);

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match usage_name(self.0) {
            Some(name) => write!(f, "{name} (0x{:02X})", self.0),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMED: &[(u8, &str)] = &[
        (0x04, "KeyA"),
        (0x1D, "KeyZ"),
        (0x1E, "Digit1"),
        (0x26, "Digit9"),
        (0x27, "Digit0"),
        (0x28, "Enter"),
        (0x2C, "Space"),
        (0x39, "CapsLock"),
        (0x3A, "F1"),
        (0x45, "F12"),
        (0x52, "ArrowUp"),
        (0x59, "Numpad1"),
        (0x62, "Numpad0"),
        (0x65, "ContextMenu"),
        (0xE0, "ControlLeft"),
        (0xE7, "MetaRight"),
    ];

    #[test]
    fn test_usage_name_covers_range_boundaries() {
        for &(code, expected) in NAMED {
            assert_eq!(usage_name(code), Some(expected), "usage 0x{code:02X}");
        }
    }

    #[test]
    fn test_usage_name_is_none_for_empty_slot_and_unassigned_usages() {
        assert_eq!(usage_name(0x00), None);
        assert_eq!(usage_name(0x87), None);
        assert_eq!(usage_name(0xFF), None);
    }

    #[test]
    fn test_key_name_display() {
        assert_eq!(KeyName(0x04).to_string(), "KeyA (0x04)");
        assert_eq!(KeyName(0x87).to_string(), "0x87");
    }
}
