use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored host as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    /// Unique display and lookup key.
    pub name: String,
    /// IP literal or DNS name.
    pub address: String,
}

impl Host {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Outcome of one reachability check against one host.
///
/// `latency_ms` is present iff `online` is true, `error` only when offline.
/// Use [`ProbeResult::online`] and [`ProbeResult::offline`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub host: String,
    pub address: String,
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// A successful probe with its round-trip time in whole milliseconds.
    #[must_use]
    pub fn online(host: &Host, latency_ms: u64) -> Self {
        Self {
            host: host.name.clone(),
            address: host.address.clone(),
            online: true,
            latency_ms: Some(latency_ms),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// A failed probe. `cause` should be short, it ends up in the UI.
    #[must_use]
    pub fn offline(host: &Host, cause: impl Into<String>) -> Self {
        Self {
            host: host.name.clone(),
            address: host.address.clone(),
            online: false,
            latency_ms: None,
            timestamp: Utc::now(),
            error: Some(cause.into()),
        }
    }
}

/// The full set of most recent probe results, one per host.
///
/// Replaced wholesale after every sweep; `sweep` is the sequence number of the
/// sweep that produced it (0 before the first sweep completed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StateSnapshot {
    pub sweep: u64,
    pub completed_at: Option<DateTime<Utc>>,
    pub hosts: HashMap<String, ProbeResult>,
}

impl StateSnapshot {
    /// Builds the snapshot for a completed sweep.
    #[must_use]
    pub fn new(sweep: u64, results: impl IntoIterator<Item = ProbeResult>) -> Self {
        Self {
            sweep,
            completed_at: Some(Utc::now()),
            hosts: results
                .into_iter()
                .map(|result| (result.host.clone(), result))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, host: &str) -> Option<&ProbeResult> {
        self.hosts.get(host)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
