//! Receiver-side wire monitor.
//!
//! Reads the packet stream exactly as the microcontroller on the far end of
//! the serial line would, and prints one decoded event per line.  Useful for
//! checking a capture run (`hid-bridge run | hid-bridge decode`) or for
//! sniffing a live serial line.

use std::io::{self, Write};

use hid_bridge_core::PacketStreamDecoder;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

const READ_CHUNK: usize = 256;

/// Counters for one monitor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub bytes: u64,
    pub events: u64,
    pub framing_errors: u64,
}

/// Decodes `reader` until end of stream, writing one line per event to `out`.
///
/// Framing errors are logged and counted; the decoder re-aligns on its own.
///
/// # Errors
///
/// Returns any I/O error from `reader` or `out`.
pub async fn monitor_wire<R, W>(reader: &mut R, out: &mut W) -> io::Result<MonitorStats>
where
    R: AsyncRead + Unpin + ?Sized,
    W: Write + ?Sized,
{
    let mut decoder = PacketStreamDecoder::new();
    let mut stats = MonitorStats::default();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        stats.bytes += n as u64;
        decoder.push(&buf[..n]);

        for decoded in decoder.by_ref() {
            match decoded {
                Ok(event) => {
                    writeln!(out, "{event}")?;
                    stats.events += 1;
                }
                Err(e) => {
                    warn!("framing error: {e}");
                    stats.framing_errors += 1;
                }
            }
        }
        out.flush()?;
    }

    if decoder.buffered() > 0 {
        warn!("stream ended with {} byte(s) of an incomplete packet", decoder.buffered());
    }
    Ok(stats)
}
