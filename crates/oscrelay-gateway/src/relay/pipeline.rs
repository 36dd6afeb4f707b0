use std::net::SocketAddr;
use std::sync::Arc;

use oscrelay_core::error::Result;
use oscrelay_core::protocol::envelope::OscEnvelope;
use oscrelay_core::protocol::osc;

use crate::config::{LoggingConfig, RuntimeCell};
use crate::obs::RelayMetrics;
use crate::realtime::{BroadcastReport, PreparedMsg, RealtimeCore};

/// What happened to one inbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Forwarded(BroadcastReport),
    Filtered,
}

/// Everything the listener needs to process a datagram. Cheap to clone.
#[derive(Clone)]
pub struct RelayPipeline {
    runtime: Arc<RuntimeCell>,
    realtime: Arc<RealtimeCore>,
    metrics: Arc<RelayMetrics>,
}

impl RelayPipeline {
    pub fn new(
        runtime: Arc<RuntimeCell>,
        realtime: Arc<RealtimeCore>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            runtime,
            realtime,
            metrics,
        }
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Process one datagram against a single config snapshot.
    ///
    /// Malformed input is returned as an error and never reaches subscribers.
    pub fn handle_datagram(&self, data: &[u8], from: SocketAddr) -> Result<Disposition> {
        let msg = match osc::decode(data) {
            Ok(m) => m,
            Err(e) => {
                self.metrics.datagrams.inc(&[("outcome", "malformed")]);
                return Err(e);
            }
        };

        let rt = self.runtime.load();
        let env = OscEnvelope::new(msg, from);
        log_message(&rt.config.logging, &env);

        if !rt.filter.allows(&env.address) {
            self.metrics.datagrams.inc(&[("outcome", "filtered")]);
            tracing::trace!(address = %env.address, "filtered");
            return Ok(Disposition::Filtered);
        }

        let prepared = PreparedMsg::text(env.to_json()?);
        let report = self.realtime.broadcast(&prepared);

        self.metrics.datagrams.inc(&[("outcome", "forwarded")]);
        self.metrics.deliveries.add(&[("result", "sent")], report.sent as u64);
        self.metrics.deliveries.add(&[("result", "dropped")], report.dropped as u64);
        self.metrics.deliveries.add(&[("result", "closed")], report.closed as u64);

        Ok(Disposition::Forwarded(report))
    }
}

fn log_message(logging: &LoggingConfig, env: &OscEnvelope) {
    let Some(level) = logging.message_level() else {
        return;
    };
    let args = serde_json::to_string(&env.args).unwrap_or_default();
    if level == tracing::Level::INFO {
        tracing::info!(target: "osc", ts = env.timestamp, address = %env.address, args = %args, source = %env.source, "OSC");
    } else {
        tracing::debug!(target: "osc", ts = env.timestamp, address = %env.address, args = %args, source = %env.source, "OSC");
    }
}
