//! Top-level facade crate for oscrelay.
//!
//! Re-exports the OSC core and the relay gateway so users can depend on a single crate.

pub mod core {
    pub use oscrelay_core::*;
}

pub mod gateway {
    pub use oscrelay_gateway::*;
}
