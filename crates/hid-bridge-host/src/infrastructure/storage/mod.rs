//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module handles:
//!
//! - Locating the TOML configuration file in the platform-appropriate directory.
//! - Providing defaults when the file does not exist yet (first run).
//!
//! Command-line flags override whatever is loaded here; that merge happens in
//! `main.rs`.

pub mod config;
