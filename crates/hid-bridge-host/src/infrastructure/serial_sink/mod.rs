//! Output side of the bridge: where encoded packets are written.
//!
//! The receiving microcontroller listens on a serial line.  On the host, that
//! line is a device node (`/dev/ttyACM0`, `COM3`) opened as a plain file; baud
//! rate and framing are configured outside this program (e.g. with `stty`).
//! Writing to stdout instead lets the packets be piped into another tool or
//! into `hid-bridge decode`.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use hid_bridge_core::IoSink;
use thiserror::Error;

/// Writer type behind every sink opened by [`open_sink`].
pub type BoxedWriter = Box<dyn Write + Send>;

/// Error type for opening an output target.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to open output {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination of the packet stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    Path(PathBuf),
}

impl OutputTarget {
    /// Parses `"stdout"` or `"-"` as standard output, anything else as a path.
    pub fn parse(value: &str) -> Self {
        match value {
            "stdout" | "-" => OutputTarget::Stdout,
            path => OutputTarget::Path(PathBuf::from(path)),
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, OutputTarget::Stdout)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("stdout"),
            OutputTarget::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Opens `target` for writing packets.
///
/// Paths are opened write-only and created if missing; existing regular
/// files are truncated.
///
/// # Errors
///
/// Returns [`OutputError::Open`] when the path cannot be opened.
pub fn open_sink(target: &OutputTarget) -> Result<IoSink<BoxedWriter>, OutputError> {
    let writer: BoxedWriter = match target {
        OutputTarget::Stdout => Box::new(io::stdout()),
        OutputTarget::Path(path) => {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .map_err(|source| OutputError::Open {
                    path: path.clone(),
                    source,
                })?;
            Box::new(file)
        }
    };
    Ok(IoSink::new(writer))
}
