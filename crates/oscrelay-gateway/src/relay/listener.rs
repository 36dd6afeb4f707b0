//! UDP listener task.
//!
//! Binds, then processes datagrams one at a time in arrival order. A bind
//! failure (or a socket that starts failing on receive) is logged and retried
//! after a fixed delay, forever, until the handle is stopped or dropped.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::relay::pipeline::RelayPipeline;

/// Delay between bind attempts.
pub const DEFAULT_BIND_RETRY: Duration = Duration::from_secs(5);

/// Largest UDP payload.
const MAX_DATAGRAM: usize = 65_536;

/// Running listener. Dropping the handle aborts the task.
pub struct ListenerHandle {
    bind: SocketAddr,
    task: JoinHandle<()>,
    local: watch::Receiver<Option<SocketAddr>>,
}

impl ListenerHandle {
    pub fn spawn(bind: SocketAddr, retry_delay: Duration, pipeline: RelayPipeline) -> Self {
        let (local_tx, local) = watch::channel(None);
        let task = tokio::spawn(run(bind, retry_delay, pipeline, local_tx));
        Self { bind, task, local }
    }

    /// Address the listener was asked to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Bound socket address, if currently bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local.borrow()
    }

    /// Watch of the bound address; `None` while (re)binding.
    pub fn local_watch(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.local.clone()
    }

    /// Abort the task and wait for it, so the port is free on return.
    pub async fn stop(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        tracing::info!(bind = %self.bind, "osc listener stopped");
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    bind: SocketAddr,
    retry_delay: Duration,
    pipeline: RelayPipeline,
    local_tx: watch::Sender<Option<SocketAddr>>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let socket = match UdpSocket::bind(bind).await {
            Ok(s) => s,
            Err(e) => {
                pipeline.metrics().bind_failures.inc(&[]);
                tracing::warn!(
                    %bind,
                    error = %e,
                    retry_ms = retry_delay.as_millis() as u64,
                    "osc listener bind failed, retrying"
                );
                tokio::time::sleep(retry_delay).await;
                continue;
            }
        };

        let local = socket.local_addr().ok();
        local_tx.send_replace(local);
        tracing::info!(addr = ?local, "osc listener bound");

        let err = loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, from)) => {
                    let data = buf.get(..len).unwrap_or_default();
                    if let Err(e) = pipeline.handle_datagram(data, from) {
                        tracing::warn!(%from, len, error = %e, "dropping datagram");
                    }
                }
                Err(e) => break e,
            }
        };

        local_tx.send_replace(None);
        drop(socket);
        tracing::warn!(
            %bind,
            error = %err,
            retry_ms = retry_delay.as_millis() as u64,
            "osc listener receive failed, rebinding"
        );
        tokio::time::sleep(retry_delay).await;
    }
}
