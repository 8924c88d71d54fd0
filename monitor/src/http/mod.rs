//! HTTP surface of the monitor.
//!
//! Thin request handling around [`crate::app::Monitor`]: authentication, the JSON API
//! and the real-time WebSocket channel.

pub mod api;
pub mod auth;
pub mod middleware;
pub mod router;
pub mod websocket;
