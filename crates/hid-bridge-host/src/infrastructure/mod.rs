//! Infrastructure layer for the host adapter.
//!
//! Contains the I/O-facing adapters: the report source (capture files or
//! stdin), the serial/stdout byte sink, configuration storage, the forwarding
//! loop that connects them, and the receiver-side wire monitor.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hid_bridge_core`, but MUST NOT be imported by the `application` layer.

pub mod bridge;
pub mod report_source;
pub mod serial_sink;
pub mod storage;
pub mod wire_monitor;
