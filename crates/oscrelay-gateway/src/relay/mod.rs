//! OSC ingress: UDP listener and the per-datagram pipeline.
//!
//! datagram -> decode -> log -> filter -> envelope -> broadcast

pub mod listener;
pub mod pipeline;

pub use listener::{ListenerHandle, DEFAULT_BIND_RETRY};
pub use pipeline::{Disposition, RelayPipeline};
