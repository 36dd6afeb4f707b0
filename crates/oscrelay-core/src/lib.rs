//! oscrelay core: OSC wire codec, relay envelopes, address filter, and errors.
//!
//! This crate defines the wire-level contracts shared by the relay gateway,
//! the producing side (HID event model, sender) and tooling. It intentionally
//! carries no transport or runtime dependencies so it can be reused in
//! multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `OscRelayError`/`Result` so the relay
//! does not crash on malformed datagrams.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod filter;
pub mod protocol;

/// Shared result type.
pub use error::{ClientCode, OscRelayError, Result};
pub use filter::{should_forward, AddressFilter};
pub use protocol::osc::{decode, encode, OscArg, OscMessage};
