//! Domain entities for the HID bridge.
//!
//! This module contains pure logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Domain code contains the core rules of the application and has **no**
//! imports from OS APIs, serial drivers, or async runtimes.  It can be
//! compiled and tested on any platform without any external setup.
//!
//! Here the rules are: what a keyboard report looks like, and which
//! press/release/modifier events separate one report from the next.

/// HID report snapshots (keyboard and mouse) and their parsers.
pub mod report;

/// The report differencing engine.
///
/// See [`diff::ReportDiffer`] for the main type.
pub mod diff;
