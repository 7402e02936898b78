//! ForwardReportsUseCase: turns host stack events into wire packets.
//!
//! This use case is the heart of the host adapter.  It receives mount,
//! unmount, and report events, keeps the [`DeviceRegistry`] current, and for
//! every keyboard report:
//!
//! 1. parses the 8-byte boot report,
//! 2. diffs it against that keyboard's retained report,
//! 3. encodes each resulting event, in order, onto the [`ByteSink`].
//!
//! Mouse reports never reach the sink; they are rendered as a log line.
//!
//! # Sink failures
//!
//! The differ commits the new report before any packet is written.  When the
//! sink fails part-way through a report, the remaining events of that report
//! are abandoned and the error is returned; the next report is diffed against
//! the committed one, so abandoned events are never re-sent.

use std::fmt;

use hid_bridge_core::{
    encode_and_send, ByteSink, InterfaceProtocol, KeyboardReport, Membership, MouseReport,
    ReportError, SinkError,
};
use thiserror::Error;
use tracing::{debug, info};

use super::manage_devices::{DeviceHandle, DeviceRegistry, DeviceState};

/// One notification from the USB host stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// An interface was enumerated.
    Mounted {
        handle: DeviceHandle,
        protocol: InterfaceProtocol,
    },
    /// An interface went away.
    Unmounted { handle: DeviceHandle },
    /// An interface delivered an input report.
    Report { handle: DeviceHandle, data: Vec<u8> },
}

/// Error type for the forward-reports use case.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("report from unknown device with {0}")]
    UnknownDevice(DeviceHandle),

    #[error("malformed report from device with {handle}: {source}")]
    MalformedReport {
        handle: DeviceHandle,
        #[source]
        source: ReportError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Running counters, exposed read-only through
/// [`ForwardReportsUseCase::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardStats {
    /// Keyboard reports diffed.
    pub reports: u64,
    /// Semantic events produced by those diffs.
    pub events: u64,
    /// Packets accepted by the sink.
    pub packets: u64,
}

impl fmt::Display for ForwardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reports, {} events, {} packets",
            self.reports, self.events, self.packets
        )
    }
}

/// Renders a mouse report as `Mouse: (x y wheel)`, followed by ` LMR` (with
/// `-` for released buttons) when a button went down since `previous_buttons`.
pub fn describe_mouse_report(report: &MouseReport, previous_buttons: u8) -> String {
    let mut line = format!("Mouse: ({} {} {})", report.x, report.y, report.wheel);

    let newly_pressed = (report.buttons ^ previous_buttons) & report.buttons;
    if newly_pressed != 0 {
        let flag = |mask: u8, c: char| if report.buttons & mask != 0 { c } else { '-' };
        line.push(' ');
        line.push(flag(MouseReport::BUTTON_LEFT, 'L'));
        line.push(flag(MouseReport::BUTTON_MIDDLE, 'M'));
        line.push(flag(MouseReport::BUTTON_RIGHT, 'R'));
    }
    line
}

/// The Forward Reports use case.
///
/// Generic over the sink so tests can substitute an in-memory buffer or a
/// mock.
pub struct ForwardReportsUseCase<S: ByteSink> {
    registry: DeviceRegistry,
    sink: S,
    flush_each_packet: bool,
    stats: ForwardStats,
}

impl<S: ByteSink> ForwardReportsUseCase<S> {
    /// Creates a use case writing to `sink`; keyboards mounted later get a
    /// differ with the given `membership`.
    pub fn new(sink: S, membership: Membership) -> Self {
        Self {
            registry: DeviceRegistry::new(membership),
            sink,
            flush_each_packet: false,
            stats: ForwardStats::default(),
        }
    }

    /// Flushes the sink after every packet instead of leaving it to the sink.
    pub fn with_flush_each_packet(mut self, flush: bool) -> Self {
        self.flush_each_packet = flush;
        self
    }

    pub fn stats(&self) -> ForwardStats {
        self.stats
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Flushes the underlying sink.
    ///
    /// # Errors
    ///
    /// Propagates the sink's [`SinkError`].
    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush()
    }

    /// Processes one host stack event.
    ///
    /// # Errors
    ///
    /// - [`ForwardError::UnknownDevice`] for a report from an unregistered
    ///   handle.
    /// - [`ForwardError::MalformedReport`] when the report is too short for
    ///   its interface protocol.
    /// - [`ForwardError::Sink`] for the first sink failure while writing a
    ///   keyboard report's packets; the rest of that report's events are
    ///   dropped.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), ForwardError> {
        match event {
            HostEvent::Mounted { handle, protocol } => {
                self.registry.mount(handle, protocol);
                Ok(())
            }
            HostEvent::Unmounted { handle } => {
                self.registry.unmount(handle);
                Ok(())
            }
            HostEvent::Report { handle, data } => self.forward_report(handle, &data),
        }
    }

    fn forward_report(&mut self, handle: DeviceHandle, data: &[u8]) -> Result<(), ForwardError> {
        let malformed = |source| ForwardError::MalformedReport { handle, source };

        match self.registry.get_mut(handle) {
            None => Err(ForwardError::UnknownDevice(handle)),

            Some(DeviceState::Keyboard(differ)) => {
                let report = KeyboardReport::from_bytes(data).map_err(malformed)?;
                let events = differ.observe(report);
                self.stats.reports += 1;
                self.stats.events += events.len() as u64;

                for event in &events {
                    debug!("{handle}: {event}");
                    encode_and_send(event, &mut self.sink)?;
                    if self.flush_each_packet {
                        self.sink.flush()?;
                    }
                    self.stats.packets += 1;
                }
                Ok(())
            }

            Some(DeviceState::Mouse(mouse)) => {
                let report = MouseReport::from_bytes(data).map_err(malformed)?;
                info!("{}", describe_mouse_report(&report, mouse.previous_buttons));
                mouse.previous_buttons = report.buttons;
                Ok(())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
