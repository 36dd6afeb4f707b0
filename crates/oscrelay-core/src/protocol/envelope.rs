//! JSON frames pushed to WebSocket subscribers.
//!
//! Two shapes travel on the subscriber channel:
//! - `{"type":"config","data":{...}}` on connect and after every config change
//! - bare OSC envelopes `{"timestamp","address","args","source"}`

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{OscRelayError, Result};
use crate::protocol::osc::{OscArg, OscMessage};

/// One decoded OSC message plus relay metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscEnvelope {
    /// Receive time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub address: String,
    pub args: Vec<OscArg>,
    /// Sender endpoint as `ip:port`.
    pub source: String,
}

impl OscEnvelope {
    /// Wrap a decoded message received from `source` at the current time.
    pub fn new(msg: OscMessage, source: SocketAddr) -> Self {
        Self::at(now_millis(), msg, source)
    }

    /// Wrap a decoded message with an explicit timestamp.
    pub fn at(timestamp: u64, msg: OscMessage, source: SocketAddr) -> Self {
        Self {
            timestamp,
            address: msg.address,
            args: msg.args,
            source: format!("{}:{}", source.ip(), source.port()),
        }
    }

    /// Serialize once for fan-out.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| OscRelayError::Internal(format!("envelope encode failed: {e}")))
    }
}

/// Configuration push frame (`type` = `"config"`).
#[derive(Debug, Serialize)]
pub struct ConfigFrame<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub frame_type: &'static str,
    pub data: &'a T,
}

impl<'a, T: Serialize> ConfigFrame<'a, T> {
    pub fn new(data: &'a T) -> Self {
        Self {
            frame_type: "config",
            data,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| OscRelayError::Internal(format!("config frame encode failed: {e}")))
    }
}

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
