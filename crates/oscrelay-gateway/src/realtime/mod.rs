//! Realtime runtime (egress engine) for the relay.
//!
//! Subscriber registry + serialize-once broadcast to every WebSocket session.

pub mod core;
pub mod types;

pub use core::{BroadcastReport, Connection, RealtimeCore, SubscriberRegistry};
pub use types::PreparedMsg;
