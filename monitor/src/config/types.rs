//! Configuration data types and structures for the monitor.
//!
//! This module contains all the data structures used for configuration,
//! including server, authentication, scheduling and host settings.

use alloc::sync::Arc;
use core::time::Duration;

use hostwatch_common::Host;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;

/// One monitored host as written in the config file.
///
/// Hosts are a TOML array of tables so their order is kept and duplicate
/// names can be reported instead of silently collapsing into one entry.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HostEntry {
    /// Display name, must be unique.
    pub name: String,
    /// IP address or DNS name to probe.
    pub address: String,
}

impl From<HostEntry> for Host {
    fn from(HostEntry { name, address }: HostEntry) -> Self {
        Self { name, address }
    }
}

/// HTTP server binding configuration section.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// TCP port for the web service.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Authentication configuration (defaults to no auth when omitted)
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            auth: AuthConfig::default(),
        }
    }
}

const fn default_port() -> u16 {
    3001
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

/// Scheduling and probing parameters.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between two scheduled sweeps.
    pub interval_secs: u64,
    /// Upper bound for one reachability check, DNS resolution included.
    pub probe_timeout_ms: u64,
    /// How many probes of one sweep may be in flight at once.
    pub max_concurrent_probes: usize,
    /// Pending messages per subscriber before it is considered dead and dropped.
    pub subscriber_queue: usize,
    /// Interval of WebSocket liveness pings.
    pub ws_heartbeat_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            probe_timeout_ms: 3000,
            max_concurrent_probes: 64,
            subscriber_queue: 32,
            ws_heartbeat_secs: 30,
        }
    }
}

impl MonitorConfig {
    /// Rejects values the scheduler or the WebSocket heartbeat cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first field that is zero but must not be.
    pub fn validate(&self) -> eyre::Result<()> {
        for (field, value) in [
            ("interval_secs", self.interval_secs),
            ("ws_heartbeat_secs", self.ws_heartbeat_secs),
            ("probe_timeout_ms", self.probe_timeout_ms),
            ("subscriber_queue", u64::try_from(self.subscriber_queue).unwrap_or(u64::MAX)),
        ] {
            if value == 0 {
                eyre::bail!("monitor.{field} must be greater than zero");
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub const fn ws_heartbeat(&self) -> Duration {
        Duration::from_secs(self.ws_heartbeat_secs)
    }
}

/// Supported authentication modes for the web API.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthMode {
    /// No authentication, everything is public
    #[default]
    None,
    /// Simple token based auth. If token is not provided, a random token will be generated
    /// and logged on startup. The token is exchanged for a signed session cookie on `/login`.
    Token { token: Option<Arc<SecretString>> },
}

impl PartialEq for AuthMode {
    fn eq(&self, other: &Self) -> bool {
        use AuthMode as AM;
        match (self, other) {
            (&AM::None, &AM::None) => true,
            (&AM::Token { token: ref t1 }, &AM::Token { token: ref t2 }) => {
                match (t1, t2) {
                    (&Some(ref t1), &Some(ref t2)) => t1.expose_secret() == t2.expose_secret(),
                    (&None, &None) => true,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

/// Authentication configuration wrapper
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(flatten)]
    pub mode: AuthMode,
    /// Optional base64-encoded cookie key (64 bytes). If omitted, a random key is generated on startup,
    /// which invalidates all sessions on restart.
    #[serde(default)]
    pub cookie_secret: Option<Arc<SecretString>>,
}

impl PartialEq for AuthConfig {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && {
            match (&self.cookie_secret, &other.cookie_secret) {
                (&Some(ref s1), &Some(ref s2)) => s1.expose_secret() == s2.expose_secret(),
                (&None, &None) => true,
                _ => false,
            }
        }
    }
}

/// Root config structure for the monitor.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct HostwatchConfig {
    /// HTTP server binding configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Scheduling and probing parameters.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Ordered list of hosts to watch.
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}
