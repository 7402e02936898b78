//! TOML-based configuration for the `hid-bridge` binary.
//!
//! Reads `BridgeConfig` from `--config <path>` or from the platform config
//! file:
//! - Windows:  `%APPDATA%\hid-bridge\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/hid-bridge/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/hid-bridge/config.toml`
//!
//! Example:
//!
//! ```toml
//! [input]
//! path = "capture.bin"      # absent = stdin
//!
//! [output]
//! target = "/dev/ttyACM0"   # or "stdout"
//! flush_each_packet = true
//!
//! [diff]
//! membership = "presence"   # or "counted"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Serde default values
//!
//! Every field has a default, so an empty file, a file with only some
//! sections, or no file at all are all valid configurations.

use std::path::{Path, PathBuf};

use hid_bridge_core::Membership;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where capture records are read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputConfig {
    /// Capture file; stdin when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Where packets are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// `"stdout"`, `"-"`, or a device/file path.
    #[serde(default = "default_output_target")]
    pub target: String,
    /// Flush the sink after every packet so bytes leave immediately.
    #[serde(default = "default_true")]
    pub flush_each_packet: bool,
}

/// Report differencing options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffConfig {
    /// How duplicate key codes within a report are treated.
    #[serde(default)]
    pub membership: Membership,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_output_target() -> String {
    "stdout".to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: default_output_target(),
            flush_each_packet: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the platform config file path, if the platform has one.
pub fn config_file_path() -> Option<PathBuf> {
    platform_config_dir().map(|dir| dir.join("config.toml"))
}

/// Parses a configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<BridgeConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads the configuration.
///
/// With `explicit` set, that file must exist.  Otherwise the platform config
/// file is used, and `BridgeConfig::default()` is returned when it does not
/// exist or the platform has no config directory.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors (including a missing
/// explicit file), and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path, false),
        None => match config_file_path() {
            Some(path) => read_config(&path, true),
            None => Ok(BridgeConfig::default()),
        },
    }
}

fn read_config(path: &Path, missing_ok: bool) -> Result<BridgeConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => {
            Ok(BridgeConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolves the platform config directory including the `hid-bridge` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("hid-bridge"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hid-bridge"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("hid-bridge")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
