//! Protocol modules.
//!
//! - `osc`: OSC 1.0 message codec (UDP wire format).
//! - `envelope`: JSON frames pushed to WebSocket subscribers.
//! - `hid`: portable input-event model mapped onto OSC messages.
//!
//! All parsers are panic-free: malformed input is reported as `OscRelayError`
//! instead of panicking or indexing raw buffers, keeping the relay resilient
//! to garbage on the UDP port.

pub mod envelope;
pub mod hid;
pub mod osc;
