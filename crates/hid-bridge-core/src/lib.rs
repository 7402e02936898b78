//! # hid-bridge-core
//!
//! Shared library for the USB HID bridge containing the keyboard report
//! differencing engine, the 2-byte serial wire codec, and HID usage names.
//!
//! It has zero dependencies on OS APIs, serial ports, or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! The bridge sits between a USB keyboard/mouse plugged into a USB host
//! controller and a second microcontroller listening on a serial line.
//! A USB keyboard does not send "key A was pressed"; it periodically sends a
//! *report*: a snapshot of every key currently held.  The bridge compares
//! consecutive snapshots and transmits only what changed.
//!
//! This crate (`hid-bridge-core`) is the part with real state and a protocol
//! contract:
//!
//! - **`domain`** – The report data model and the [`ReportDiffer`], which
//!   turns two snapshots into an ordered list of [`SemanticEvent`]s
//!   (modifier change first, releases next, presses last).
//!
//! - **`protocol`** – How events travel over the wire.  Every event becomes
//!   exactly one 16-bit packet sent high byte first, framed only by 3-bit
//!   start/stop markers.
//!
//! - **`keymap`** – Human-readable names for HID keyboard usages, used only
//!   for log output.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hid_bridge_core::ReportDiffer` instead of the full module path.
pub use domain::diff::{diff_reports, Membership, ReportDiffer, SemanticEvent};
pub use domain::report::{
    InterfaceProtocol, KeyboardReport, ModifierMask, MouseReport, ReportError,
};
pub use keymap::hid::KeyName;
pub use protocol::codec::{decode_packet, encode_event, PacketStreamDecoder, ProtocolError};
pub use protocol::encoder::{encode_and_send, ByteSink, IoSink, SinkError};
pub use protocol::packet::WirePacket;
