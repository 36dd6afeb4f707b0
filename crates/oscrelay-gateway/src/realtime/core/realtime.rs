use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use crate::realtime::core::SubscriberRegistry;
use crate::realtime::types::PreparedMsg;

/// Per-broadcast delivery outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Queued on the subscriber's writer.
    pub sent: usize,
    /// Writer queue full; this message skipped for that subscriber.
    pub dropped: usize,
    /// Session gone; subscriber pruned.
    pub closed: usize,
}

/// Egress engine: fans one prepared frame out to every subscriber.
pub struct RealtimeCore {
    pub subscribers: Arc<SubscriberRegistry>,
}

impl Default for RealtimeCore {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeCore {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(SubscriberRegistry::new()),
        }
    }

    /// Lossy broadcast: `try_send` only, never awaits a slow subscriber.
    ///
    /// Each subscriber's queue is FIFO, so messages broadcast from one task
    /// reach every subscriber in broadcast order.
    pub fn broadcast(&self, msg: &PreparedMsg) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut gone = Vec::new();

        for (id, conn) in self.subscribers.snapshot() {
            match conn.tx.try_send(msg.to_ws_message()) {
                Ok(()) => report.sent += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    tracing::debug!(subscriber = id, "subscriber queue full, message dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    report.closed += 1;
                    gone.push(id);
                }
            }
        }

        for id in gone {
            self.subscribers.remove(id);
            tracing::debug!(subscriber = id, "pruned closed subscriber");
        }

        report
    }
}
