//! Binary capture stream reader.
//!
//! A capture is a flat sequence of records, each starting with a tag byte:
//!
//! ```text
//! 0x01 addr inst protocol        interface mounted (protocol 0/1/2)
//! 0x02 addr inst                 interface unmounted
//! 0x03 addr inst len data[len]   input report
//! ```
//!
//! There is no file header.  End of input between records ends the stream
//! cleanly; end of input inside a record is [`SourceError::Truncated`].

use async_trait::async_trait;
use hid_bridge_core::InterfaceProtocol;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{ReportSource, SourceError};
use crate::application::forward_reports::HostEvent;
use crate::application::manage_devices::DeviceHandle;

pub const RECORD_MOUNT: u8 = 0x01;
pub const RECORD_UNMOUNT: u8 = 0x02;
pub const RECORD_REPORT: u8 = 0x03;

/// Largest report a single record can carry (the length field is one byte).
pub const MAX_RECORD_REPORT_LEN: usize = u8::MAX as usize;

/// Reads [`HostEvent`]s from any async byte stream.
pub struct CaptureReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin + Send> CaptureReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads one tag byte, or `None` at a clean end of stream.
    async fn read_tag(&mut self) -> Result<Option<u8>, SourceError> {
        let mut tag = [0u8; 1];
        match self.inner.read(&mut tag).await? {
            0 => Ok(None),
            _ => Ok(Some(tag[0])),
        }
    }

    /// Fills `buf` completely; running out of input here is a truncated record.
    async fn read_body(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        match self.inner.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(SourceError::Truncated),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_fields<const N: usize>(&mut self) -> Result<[u8; N], SourceError> {
        let mut fields = [0u8; N];
        self.read_body(&mut fields).await?;
        Ok(fields)
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ReportSource for CaptureReader<R> {
    async fn next_event(&mut self) -> Result<Option<HostEvent>, SourceError> {
        let Some(tag) = self.read_tag().await? else {
            return Ok(None);
        };

        let event = match tag {
            RECORD_MOUNT => {
                let [address, instance, protocol] = self.read_fields::<3>().await?;
                HostEvent::Mounted {
                    handle: DeviceHandle::new(address, instance),
                    protocol: InterfaceProtocol::from(protocol),
                }
            }
            RECORD_UNMOUNT => {
                let [address, instance] = self.read_fields::<2>().await?;
                HostEvent::Unmounted {
                    handle: DeviceHandle::new(address, instance),
                }
            }
            RECORD_REPORT => {
                let [address, instance, len] = self.read_fields::<3>().await?;
                let mut data = vec![0u8; usize::from(len)];
                self.read_body(&mut data).await?;
                HostEvent::Report {
                    handle: DeviceHandle::new(address, instance),
                    data,
                }
            }
            other => return Err(SourceError::UnknownRecord(other)),
        };
        Ok(Some(event))
    }
}

/// Serializes `event` as one capture record.
///
/// # Errors
///
/// Returns [`SourceError::ReportTooLong`] for a report longer than
/// [`MAX_RECORD_REPORT_LEN`] bytes.
pub fn encode_record(event: &HostEvent) -> Result<Vec<u8>, SourceError> {
    let record = match event {
        HostEvent::Mounted { handle, protocol } => {
            let protocol = match protocol {
                InterfaceProtocol::None => 0,
                InterfaceProtocol::Keyboard => 1,
                InterfaceProtocol::Mouse => 2,
            };
            vec![RECORD_MOUNT, handle.address, handle.instance, protocol]
        }
        HostEvent::Unmounted { handle } => vec![RECORD_UNMOUNT, handle.address, handle.instance],
        HostEvent::Report { handle, data } => {
            let len = u8::try_from(data.len()).map_err(|_| SourceError::ReportTooLong(data.len()))?;
            let mut record = Vec::with_capacity(4 + data.len());
            record.extend_from_slice(&[RECORD_REPORT, handle.address, handle.instance, len]);
            record.extend_from_slice(data);
            record
        }
    };
    Ok(record)
}
