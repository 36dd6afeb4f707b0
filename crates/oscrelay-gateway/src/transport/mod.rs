//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler that turns a browser connection into a
//! relay subscriber.

pub mod ws;
