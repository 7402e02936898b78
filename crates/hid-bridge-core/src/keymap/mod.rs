//! Key code naming for log output.
//!
//! The wire carries raw HID Usage IDs (page 0x07, Keyboard/Keypad); names
//! here exist purely so that logs read `KeyA (0x04)` instead of `0x04`.
//! Nothing in this module influences the bytes that reach the serial link.

pub mod hid;

pub use hid::{usage_name, KeyName};
