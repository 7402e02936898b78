//! Event encoder and the byte sink it writes into.
//!
//! # Sink contract
//!
//! The encoder defines no failure policy of its own.  Whatever the sink
//! returns is handed back to the caller unchanged: no retries, no partial
//! write recovery, no logging.  Deciding whether a failed packet is dropped,
//! retried, or escalated is the caller's job.

use std::io::{self, Write};

use thiserror::Error;

use crate::domain::diff::SemanticEvent;
use crate::protocol::codec::encode_event;

/// Errors a [`ByteSink`] may report.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying transport is closed and accepts no more bytes.
    #[error("sink is closed")]
    Closed,

    /// The underlying transport reported an I/O error.
    #[error("sink I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sink refused the bytes for a sink-specific reason.
    #[error("sink rejected write: {0}")]
    Rejected(String),
}

/// Blocking, synchronous outbound byte stream.
///
/// A production implementation wraps a serial port or stdout; tests use
/// `Vec<u8>` or a mock.
#[cfg_attr(test, mockall::automock)]
pub trait ByteSink {
    /// Appends `bytes` to the outgoing stream, all or nothing from the
    /// caller's point of view.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Pushes any buffered bytes to the transport.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Adapts any [`std::io::Write`] into a [`ByteSink`].
///
/// `write_all` is used so a short write never splits a packet silently.
/// A transport that stops accepting bytes (`WriteZero`, `BrokenPipe`) is
/// reported as [`SinkError::Closed`].
#[derive(Debug)]
pub struct IoSink<W: Write> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.inner.write_all(bytes).map_err(map_io_error)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush().map_err(map_io_error)
    }
}

fn map_io_error(e: io::Error) -> SinkError {
    match e.kind() {
        io::ErrorKind::WriteZero | io::ErrorKind::BrokenPipe => SinkError::Closed,
        _ => SinkError::Io(e),
    }
}

/// Serializes `event` and writes its two bytes to `sink`, high byte first.
///
/// Exactly one `write_bytes` call of two bytes is made per event.
///
/// # Errors
///
/// Propagates the sink's [`SinkError`] unchanged.
///
/// # Examples
///
/// ```rust
/// use hid_bridge_core::{encode_and_send, SemanticEvent};
///
/// let mut wire: Vec<u8> = Vec::new();
/// encode_and_send(&SemanticEvent::KeyPressed { code: 0x04 }, &mut wire).unwrap();
/// assert_eq!(wire, [0xB0, 0x47]);
/// ```
pub fn encode_and_send<S: ByteSink + ?Sized>(
    event: &SemanticEvent,
    sink: &mut S,
) -> Result<(), SinkError> {
    sink.write_bytes(&encode_event(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::ModifierMask;

    /// Writer that accepts a fixed number of bytes, then reports zero-length writes.
    struct ShortWriter {
        capacity: usize,
        written: Vec<u8>,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.capacity - self.written.len());
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_encode_and_send_writes_two_bytes_in_one_call() {
        // Arrange
        let mut sink = MockByteSink::new();
        sink.expect_write_bytes()
            .withf(|bytes: &[u8]| *bytes == [0xB0, 0x47])
            .times(1)
            .returning(|_| Ok(()));

        // Act
        let result = encode_and_send(&SemanticEvent::KeyPressed { code: 0x04 }, &mut sink);

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_encode_and_send_propagates_sink_error() {
        let mut sink = MockByteSink::new();
        sink.expect_write_bytes()
            .times(1)
            .returning(|_| Err(SinkError::Closed));

        let result = encode_and_send(&SemanticEvent::KeyReleased { code: 0x04 }, &mut sink);

        assert!(matches!(result, Err(SinkError::Closed)));
    }

    #[test]
    fn test_encode_and_send_does_not_flush() {
        let mut sink = MockByteSink::new();
        sink.expect_write_bytes().returning(|_| Ok(()));
        sink.expect_flush().never();

        encode_and_send(
            &SemanticEvent::ModifierChanged {
                new_mask: ModifierMask(0x02),
            },
            &mut sink,
        )
        .unwrap();
    }

    #[test]
    fn test_vec_sink_appends_packets() {
        let mut wire: Vec<u8> = vec![0xEE];

        encode_and_send(&SemanticEvent::KeyPressed { code: 0x04 }, &mut wire).unwrap();
        encode_and_send(&SemanticEvent::KeyReleased { code: 0x04 }, &mut wire).unwrap();

        assert_eq!(wire, [0xEE, 0xB0, 0x47, 0xA0, 0x46]);
    }

    #[test]
    fn test_boxed_sink_forwards_writes() {
        let mut sink: Box<dyn ByteSink> = Box::new(IoSink::new(Vec::new()));
        encode_and_send(&SemanticEvent::KeyPressed { code: 0x04 }, &mut sink).unwrap();
        sink.flush().unwrap();
    }

    #[test]
    fn test_io_sink_writes_through() {
        let mut sink = IoSink::new(Vec::new());

        encode_and_send(&SemanticEvent::KeyPressed { code: 0x2C }, &mut sink).unwrap();

        assert_eq!(sink.into_inner(), [0xB2, 0xC7]);
    }

    #[test]
    fn test_io_sink_reports_closed_when_writer_stops_accepting() {
        // Arrange: room for one byte only
        let mut sink = IoSink::new(ShortWriter {
            capacity: 1,
            written: Vec::new(),
        });

        // Act
        let result = encode_and_send(&SemanticEvent::KeyPressed { code: 0x04 }, &mut sink);

        // Assert
        assert!(matches!(result, Err(SinkError::Closed)));
        assert_eq!(sink.get_ref().written, [0xB0]);
    }

    #[test]
    fn test_io_sink_maps_other_errors_to_io() {
        struct FailingWriter;
        impl Write for FailingWriter {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = IoSink::new(FailingWriter);
        let result = sink.write_bytes(&[0x00]);

        assert!(matches!(result, Err(SinkError::Io(ref e)) if e.kind() == io::ErrorKind::PermissionDenied));
    }
}
