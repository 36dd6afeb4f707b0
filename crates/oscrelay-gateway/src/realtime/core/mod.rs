//! Realtime core components: subscriber registry and the broadcast engine.

mod realtime;
mod session_registry;

pub use realtime::{BroadcastReport, RealtimeCore};
pub use session_registry::{Connection, SubscriberRegistry};
