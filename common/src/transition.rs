use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProbeResult;

/// Direction of a reachability flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// offline -> online
    Recovered,
    /// online -> offline
    Down,
}

/// A host's reachability flipped between two consecutive sweeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub host: String,
    pub address: String,
    pub previous_online: bool,
    pub new_online: bool,
    pub classification: Classification,
    pub timestamp: DateTime<Utc>,
}

/// Compares a fresh probe result with the previously stored one for the same host.
///
/// Returns `None` for the first observation of a host (no baseline) and when the
/// online flag did not change.
#[must_use]
pub fn detect(previous: Option<&ProbeResult>, current: &ProbeResult) -> Option<TransitionEvent> {
    let previous = previous?;
    if previous.online == current.online {
        return None;
    }
    let classification = if current.online {
        Classification::Recovered
    } else {
        Classification::Down
    };
    Some(TransitionEvent {
        host: current.host.clone(),
        address: current.address.clone(),
        previous_online: previous.online,
        new_online: current.online,
        classification,
        timestamp: current.timestamp,
    })
}
