//! UDP OSC sender for the producing side.
//!
//! Wraps one connected UDP socket. Sends are fire-and-forget: a failure is
//! logged and returned, never retried.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::{lookup_host, ToSocketAddrs, UdpSocket};

use oscrelay_core::error::{OscRelayError, Result};
use oscrelay_core::protocol::hid::{HidEvent, HidSendFilter};
use oscrelay_core::protocol::osc::{self, OscArg, OscMessage};

pub struct OscSender {
    socket: UdpSocket,
    target: SocketAddr,
    enabled: AtomicBool,
}

impl OscSender {
    /// Resolve `target` and bind an ephemeral local socket of the same family.
    pub async fn connect(target: impl ToSocketAddrs) -> Result<Self> {
        let target = lookup_host(target)
            .await
            .map_err(|e| OscRelayError::BadRequest(format!("resolve target failed: {e}")))?
            .next()
            .ok_or_else(|| OscRelayError::BadRequest("target resolved to no address".into()))?;

        let local = match target {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| OscRelayError::Internal(format!("bind sender socket failed: {e}")))?;
        socket
            .connect(target)
            .await
            .map_err(|e| OscRelayError::Internal(format!("connect {target} failed: {e}")))?;

        tracing::info!(target_addr = %target, "OSC sender ready");
        Ok(Self {
            socket,
            target,
            enabled: AtomicBool::new(true),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Encode and send. Returns bytes sent, or 0 when disabled.
    pub async fn send(&self, address: &str, args: &[OscArg]) -> Result<usize> {
        if !self.is_enabled() {
            return Ok(0);
        }
        let packet = osc::encode(address, args);
        self.socket.send(&packet).await.map_err(|e| {
            tracing::warn!(target_addr = %self.target, address, error = %e, "failed to send OSC message");
            OscRelayError::Internal(format!("send failed: {e}"))
        })
    }

    pub async fn send_message(&self, msg: &OscMessage) -> Result<usize> {
        self.send(&msg.address, &msg.args).await
    }

    /// Send a captured input event if `filter` lets it through.
    /// Returns whether a message was sent.
    pub async fn send_event(
        &self,
        event: &HidEvent,
        prefix: &str,
        filter: &HidSendFilter,
    ) -> Result<bool> {
        if !filter.allows(event) {
            tracing::trace!(event = %event.name(), "event filtered out");
            return Ok(false);
        }
        let msg = event.to_message(prefix);
        let n = self.send_message(&msg).await?;
        Ok(n > 0)
    }
}
