//! Report source infrastructure.
//!
//! On the device, host stack callbacks deliver mount, unmount, and report
//! notifications.  Off the device, the same notifications are replayed from
//! a capture stream (a file or stdin) in the record format read by
//! [`capture::CaptureReader`].
//!
//! # Testability
//!
//! The `ReportSource` trait allows unit tests to inject synthetic events
//! without any file or device; see [`mock::MockReportSource`].

use async_trait::async_trait;
use thiserror::Error;

use crate::application::forward_reports::HostEvent;

pub mod capture;
pub mod mock;

/// Error type for report source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading report stream: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a record.
    #[error("report stream truncated inside a record")]
    Truncated,

    #[error("unknown capture record tag 0x{0:02X}")]
    UnknownRecord(u8),

    /// A report longer than one record can carry.
    #[error("report of {0} bytes does not fit in a capture record")]
    ReportTooLong(usize),
}

/// Trait abstracting where host stack events come from.
#[async_trait]
pub trait ReportSource: Send {
    /// Waits for the next event.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    async fn next_event(&mut self) -> Result<Option<HostEvent>, SourceError>;
}
