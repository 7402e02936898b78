//! `hid-bridge` entry point.
//!
//! Replays USB host stack events (mounts, unmounts, input reports) from a
//! capture stream, turns keyboard reports into 2-byte wire packets, and
//! writes them to a serial device or stdout.
//!
//! # Usage
//!
//! ```text
//! hid-bridge [--config <PATH>] [--log-level <LEVEL>] run
//!            [--input <PATH>] [--output <TARGET>] [--membership presence|counted]
//! hid-bridge [--config <PATH>] [--log-level <LEVEL>] decode [--input <PATH>]
//! ```
//!
//! Flags override the config file, which overrides built-in defaults.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()             -- TOML file or defaults
//!  └─ run
//!       ├─ CaptureReader        (stdin or capture file)
//!       ├─ ForwardReportsUseCase (per-keyboard differ + encoder)
//!       └─ IoSink               (serial device or stdout)
//!  └─ decode
//!       └─ monitor_wire         (receiver-side view of the packet stream)
//! ```
//!
//! Logs always go to stderr: stdout may be carrying the packet stream.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncRead, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hid_bridge_core::Membership;
use hid_bridge_host::application::forward_reports::ForwardReportsUseCase;
use hid_bridge_host::infrastructure::bridge::run_bridge;
use hid_bridge_host::infrastructure::report_source::capture::CaptureReader;
use hid_bridge_host::infrastructure::serial_sink::{open_sink, OutputTarget};
use hid_bridge_host::infrastructure::storage::config::{load_config, BridgeConfig};
use hid_bridge_host::infrastructure::wire_monitor::monitor_wire;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// USB HID keyboard report bridge.
#[derive(Debug, Parser)]
#[command(
    name = "hid-bridge",
    about = "Forwards USB HID keyboard reports as 2-byte serial packets",
    version
)]
struct Cli {
    /// Configuration file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "HID_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "HID_BRIDGE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Forward a capture stream to the output as wire packets.
    Run {
        /// Capture file to read.  Defaults to `[input] path`, then stdin.
        #[arg(long)]
        input: Option<PathBuf>,

        /// `stdout`, `-`, or a serial device / file path.
        #[arg(long, value_parser = parse_output_target)]
        output: Option<OutputTarget>,

        /// Duplicate key code handling: `presence` or `counted`.
        #[arg(long, value_parser = parse_membership)]
        membership: Option<Membership>,
    },

    /// Decode a wire packet stream and print one event per line.
    Decode {
        /// Packet stream to read.  Defaults to stdin.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn parse_output_target(value: &str) -> Result<OutputTarget, String> {
    Ok(OutputTarget::parse(value))
}

fn parse_membership(value: &str) -> Result<Membership, String> {
    match value {
        "presence" => Ok(Membership::Presence),
        "counted" => Ok(Membership::Counted),
        other => Err(format!(
            "unknown membership '{other}' (expected 'presence' or 'counted')"
        )),
    }
}

/// Effective settings for `run` after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunSettings {
    input: Option<PathBuf>,
    output: OutputTarget,
    membership: Membership,
    flush_each_packet: bool,
}

impl RunSettings {
    fn resolve(
        config: &BridgeConfig,
        input: Option<PathBuf>,
        output: Option<OutputTarget>,
        membership: Option<Membership>,
    ) -> Self {
        Self {
            input: input.or_else(|| config.input.path.clone()),
            output: output.unwrap_or_else(|| OutputTarget::parse(&config.output.target)),
            membership: membership.unwrap_or(config.diff.membership),
            flush_each_packet: config.output.flush_each_packet,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    // `RUST_LOG` wins; otherwise --log-level, then the config file.
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run {
            input,
            output,
            membership,
        } => run(RunSettings::resolve(&config, input, output, membership)).await,
        Command::Decode { input } => decode(input.as_deref()).await,
    }
}

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

async fn open_input(path: Option<&Path>) -> anyhow::Result<BoxedReader> {
    let reader: BoxedReader = match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    Ok(reader)
}

async fn run(settings: RunSettings) -> anyhow::Result<()> {
    let input = open_input(settings.input.as_deref()).await?;
    let sink = open_sink(&settings.output)
        .with_context(|| format!("failed to open output {}", settings.output))?;

    info!(
        "hid-bridge starting: input={}, output={}, membership={:?}",
        settings
            .input
            .as_deref()
            .map_or_else(|| "stdin".to_string(), |p| p.display().to_string()),
        settings.output,
        settings.membership
    );

    let mut source = CaptureReader::new(input);
    let mut use_case = ForwardReportsUseCase::new(sink, settings.membership)
        .with_flush_each_packet(settings.flush_each_packet);

    let outcome = tokio::select! {
        result = run_bridge(&mut source, &mut use_case) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, stopping");
            Ok(())
        }
    };

    if let Err(e) = use_case.flush() {
        warn!("final flush failed: {e}");
    }
    info!("hid-bridge stopped: {}", use_case.stats());

    outcome.context("forwarding stopped")
}

async fn decode(input: Option<&Path>) -> anyhow::Result<()> {
    let mut reader = open_input(input).await?;
    let mut stdout = std::io::stdout();

    let stats = tokio::select! {
        result = monitor_wire(&mut reader, &mut stdout) => result.context("wire monitor failed")?,
        Ok(()) = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, stopping");
            return Ok(());
        }
    };

    info!(
        "decoded {} events from {} bytes ({} framing errors)",
        stats.events, stats.bytes, stats.framing_errors
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
