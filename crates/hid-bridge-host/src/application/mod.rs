//! Application layer use cases for the host adapter.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules, here `hid_bridge_core`) and the infrastructure (files,
//! serial devices, stdin/stdout).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** core objects to fulfil a goal (e.g., "turn each keyboard
//!   report into wire packets").
//! - **Depend on abstractions** (the [`ByteSink`] trait) rather than concrete
//!   devices, so tests can capture output in memory.
//! - **Contain no file system or terminal access**.
//!
//! # Sub-modules
//!
//! - **`manage_devices`** – Tracks mounted HID interfaces and owns one
//!   report differ per keyboard.
//!
//! - **`forward_reports`** – Dispatches incoming reports by interface
//!   protocol: keyboard reports are diffed and encoded onto the sink, mouse
//!   reports are displayed.
//!
//! [`ByteSink`]: hid_bridge_core::ByteSink

pub mod forward_reports;
pub mod manage_devices;
