use serde::{Deserialize, Serialize};

use crate::{StateSnapshot, TransitionEvent};

/// Messages pushed from the monitor to real-time subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WsMessage {
    /// The complete current state. Sent once on connect and after every sweep.
    Snapshot(StateSnapshot),
    /// One host flipped between online and offline.
    Transition(TransitionEvent),
}

/// Messages a real-time subscriber may send to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Request an on-demand sweep of all hosts.
    ManualCheck,
}
