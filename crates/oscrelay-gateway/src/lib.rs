//! oscrelay gateway library entry.
//!
//! This crate wires the UDP listener, the broadcast engine, the WebSocket
//! transport and the HTTP control surface into one relay. It also carries the
//! producing side's UDP sender. It is intended to be consumed by the binaries
//! and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod relay;
pub mod router;
pub mod sender;
pub mod transport;
