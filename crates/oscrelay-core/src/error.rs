//! Shared error type across oscrelay crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input (bad config patch, bad pattern, bad argument).
    BadRequest,
    /// Inbound datagram is not a well-formed OSC message.
    MalformedPacket,
    /// Internal error (I/O, serialization).
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::MalformedPacket => "MALFORMED_PACKET",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, OscRelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum OscRelayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("malformed packet: {0}")]
    MalformedPacket(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl OscRelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            OscRelayError::BadRequest(_) => ClientCode::BadRequest,
            OscRelayError::MalformedPacket(_) => ClientCode::MalformedPacket,
            OscRelayError::Internal(_) => ClientCode::Internal,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        OscRelayError::MalformedPacket(msg.into())
    }
}
