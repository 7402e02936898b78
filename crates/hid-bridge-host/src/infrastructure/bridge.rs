//! The forwarding loop connecting a [`ReportSource`] to the use case.
//!
//! ```text
//! ReportSource ──HostEvent──► ForwardReportsUseCase ──packets──► ByteSink
//! ```
//!
//! The loop owns the error policy for one run:
//!
//! | Failure                          | Action                          |
//! |----------------------------------|---------------------------------|
//! | report from an unknown device    | warn, skip the report           |
//! | malformed report                 | warn, skip the report           |
//! | sink closed                      | stop with [`BridgeError`]       |
//! | other sink error                 | error log, drop the packets     |
//! | source error                     | stop with [`BridgeError`]       |

use hid_bridge_core::{ByteSink, SinkError};
use thiserror::Error;
use tracing::{error, warn};

use super::report_source::{ReportSource, SourceError};
use crate::application::forward_reports::{ForwardError, ForwardReportsUseCase};

/// Errors that end a forwarding run.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("report source failed: {0}")]
    Source(#[from] SourceError),

    #[error("output closed")]
    SinkClosed,
}

/// Forwards every event from `source` until it is exhausted.
///
/// Returns `Ok(())` at the end of the source.  Cancelling the returned future
/// (e.g. on Ctrl-C) stops between two events or while waiting for the next.
///
/// # Errors
///
/// Returns [`BridgeError::Source`] when the source fails and
/// [`BridgeError::SinkClosed`] when the sink reports it is closed.
pub async fn run_bridge<R, S>(
    source: &mut R,
    use_case: &mut ForwardReportsUseCase<S>,
) -> Result<(), BridgeError>
where
    R: ReportSource + ?Sized,
    S: ByteSink,
{
    while let Some(event) = source.next_event().await? {
        match use_case.handle_event(event) {
            Ok(()) => {}
            Err(ForwardError::Sink(SinkError::Closed)) => return Err(BridgeError::SinkClosed),
            Err(ForwardError::Sink(e)) => {
                error!("sink write failed, dropping remaining packets of report: {e}");
            }
            Err(e @ (ForwardError::UnknownDevice(_) | ForwardError::MalformedReport { .. })) => {
                warn!("skipping report: {e}");
            }
        }
    }
    Ok(())
}
