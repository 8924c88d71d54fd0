//! Configuration loading utilities for the monitor.
//!
//! This module provides functions for reading and parsing
//! configuration files from disk.

use std::path::Path;

use eyre::WrapErr as _;
use tokio::fs;

use crate::config::HostwatchConfig;

/// Reads and parses the monitor config from a TOML file.
///
/// Syntax and the `[monitor]` settings are checked here; the host list is
/// validated when the [`crate::app::HostRegistry`] is built from it.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub async fn load<P: AsRef<Path>>(path: P) -> eyre::Result<HostwatchConfig> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(&path).await.wrap_err(format!(
        "Failed to read config file at: {}",
        path_ref.display()
    ))?;
    parse(&content).wrap_err(format!(
        "Invalid config at: {}",
        path_ref.display()
    ))
}

/// Parses a config from its TOML source.
///
/// # Errors
///
/// Returns an error if the content is not valid TOML, does not match the config schema,
/// or holds monitor settings that cannot be scheduled.
pub fn parse(content: &str) -> eyre::Result<HostwatchConfig> {
    let config: HostwatchConfig = toml::from_str(content)?;
    config.monitor.validate()?;
    Ok(config)
}
