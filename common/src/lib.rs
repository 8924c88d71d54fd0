//! Data model shared between the monitor service and its clients.
//!
//! This crate provides:
//! - the host, probe result and snapshot types
//! - pure transition detection between two probe results
//! - the messages exchanged over the real-time channel

mod message;
mod model;
mod transition;

pub use message::*;
pub use model::*;
pub use transition::*;
