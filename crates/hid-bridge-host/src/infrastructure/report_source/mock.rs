//! Mock report source for unit testing.
//!
//! Allows tests to queue synthetic [`HostEvent`]s without a capture file or
//! a USB host stack.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{ReportSource, SourceError};
use crate::application::forward_reports::HostEvent;

/// A queue-backed implementation of [`ReportSource`].
///
/// Yields the queued events in order, then the configured failure (once), then
/// end of stream.
#[derive(Debug, Default)]
pub struct MockReportSource {
    events: VecDeque<HostEvent>,
    failure: Option<SourceError>,
    polls: usize,
}

impl MockReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that yields `events` in order.
    pub fn with_events(events: impl IntoIterator<Item = HostEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Queues one more event.
    pub fn push(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }

    /// Makes the source fail with `error` once the queue is drained.
    pub fn fail_after_events(mut self, error: SourceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of times [`ReportSource::next_event`] was called.
    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl ReportSource for MockReportSource {
    async fn next_event(&mut self) -> Result<Option<HostEvent>, SourceError> {
        self.polls += 1;
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        match self.failure.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }
}
