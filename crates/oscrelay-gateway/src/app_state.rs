//! Shared application state for the relay.
//!
//! Owns the runtime config cell, the subscriber registry, metrics and the
//! OSC listener slot. Config changes are serialized through `control`, which
//! also owns the listener handle, so "apply config" and "restart listener"
//! happen as one step.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use oscrelay_core::error::{OscRelayError, Result};
use oscrelay_core::protocol::envelope::ConfigFrame;

use crate::config::{self, ConfigPatch, RelayConfig, RuntimeCell, RuntimeConfig};
use crate::obs::RelayMetrics;
use crate::realtime::{Connection, PreparedMsg, RealtimeCore};
use crate::relay::{ListenerHandle, RelayPipeline, DEFAULT_BIND_RETRY};

/// Construction options that are not part of the persisted config.
#[derive(Debug, Clone)]
pub struct StateOptions {
    /// Where accepted config changes are written. `None` disables persistence.
    pub config_path: Option<PathBuf>,
    /// Interface the OSC listener binds.
    pub osc_bind_ip: IpAddr,
    pub bind_retry: Duration,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            osc_bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            bind_retry: DEFAULT_BIND_RETRY,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    realtime: Arc<RealtimeCore>,
    metrics: Arc<RelayMetrics>,
}

struct AppStateInner {
    runtime: Arc<RuntimeCell>,
    pipeline: RelayPipeline,
    control: Mutex<Option<ListenerHandle>>,
    opts: StateOptions,
}

impl AppState {
    /// Build application state. The listener is not started until [`AppState::start`].
    pub fn new(cfg: RelayConfig, opts: StateOptions) -> Result<Self> {
        let runtime = Arc::new(RuntimeCell::new(RuntimeConfig::compile(cfg)?));
        let realtime = Arc::new(RealtimeCore::new());
        let metrics = Arc::new(RelayMetrics::default());
        let pipeline = RelayPipeline::new(
            Arc::clone(&runtime),
            Arc::clone(&realtime),
            Arc::clone(&metrics),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                runtime,
                pipeline,
                control: Mutex::new(None),
                opts,
            }),
            realtime,
            metrics,
        })
    }

    /// Start the OSC listener if the config says so.
    pub async fn start(&self) {
        let mut slot = self.inner.control.lock().await;
        let cfg = self.inner.runtime.load();
        self.reconcile(&mut slot, &cfg.config, true).await;
    }

    /// Stop the OSC listener (shutdown path).
    pub async fn shutdown(&self) {
        let mut slot = self.inner.control.lock().await;
        if let Some(h) = slot.take() {
            h.stop().await;
        }
    }

    /// Current config snapshot.
    pub fn runtime(&self) -> Arc<RuntimeConfig> {
        self.inner.runtime.load()
    }

    pub fn cfg(&self) -> RelayConfig {
        self.inner.runtime.load().config.clone()
    }

    pub fn realtime(&self) -> Arc<RealtimeCore> {
        Arc::clone(&self.realtime)
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn pipeline(&self) -> &RelayPipeline {
        &self.inner.pipeline
    }

    /// Extra gauge lines for `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![("oscrelay_subscribers_active", self.realtime.subscribers.len() as u64)]
    }

    /// `{"type":"config","data":...}` for the current config.
    pub fn config_frame(&self) -> Result<PreparedMsg> {
        config_frame_of(&self.inner.runtime.load())
    }

    /// Register a subscriber whose queue starts with the current config.
    ///
    /// A config swap that lands between building the frame and registering
    /// would broadcast past this subscriber, so the snapshot is re-checked
    /// after registering until it is stable. The newest config is queued last.
    pub fn subscribe(&self, conn: Connection) -> Result<u64> {
        let mut shown = self.inner.runtime.load();
        queue_frame(&conn, config_frame_of(&shown)?)?;
        let id = self.realtime.subscribers.register(conn.clone());

        loop {
            let now = self.inner.runtime.load();
            if Arc::ptr_eq(&now, &shown) {
                return Ok(id);
            }
            if let Err(e) = config_frame_of(&now).and_then(|f| queue_frame(&conn, f)) {
                self.realtime.subscribers.remove(id);
                return Err(e);
            }
            shown = now;
        }
    }

    /// Bound OSC socket address, waiting for an in-progress bind.
    /// `None` when the relay is disabled or the listener stops meanwhile.
    pub async fn osc_local_addr(&self) -> Option<SocketAddr> {
        let mut rx = {
            let slot = self.inner.control.lock().await;
            slot.as_ref()?.local_watch()
        };
        let bound = rx.wait_for(|a| a.is_some()).await.ok()?;
        *bound
    }

    /// Bound OSC socket address right now, without waiting.
    pub async fn osc_bound_now(&self) -> Option<SocketAddr> {
        let slot = self.inner.control.lock().await;
        slot.as_ref().and_then(|h| h.local_addr())
    }

    /// Apply a partial config update.
    pub async fn apply_patch(&self, patch: &ConfigPatch) -> Result<RelayConfig> {
        let mut slot = self.inner.control.lock().await;
        let next = patch.apply_to(&self.inner.runtime.load().config);
        self.replace(&mut slot, next).await
    }

    /// Flip `enabled`; returns the new value.
    pub async fn toggle(&self) -> Result<bool> {
        let mut slot = self.inner.control.lock().await;
        let mut next = self.inner.runtime.load().config.clone();
        next.enabled = !next.enabled;
        let applied = self.replace(&mut slot, next).await?;
        Ok(applied.enabled)
    }

    /// Validate, swap, persist, reconcile the listener, notify subscribers.
    async fn replace(
        &self,
        slot: &mut Option<ListenerHandle>,
        next: RelayConfig,
    ) -> Result<RelayConfig> {
        let compiled = RuntimeConfig::compile(next)?;
        let prev = self.inner.runtime.load();
        let cfg = compiled.config.clone();
        self.inner.runtime.store(compiled);

        self.persist(&cfg);

        if cfg.web_server_port != prev.config.web_server_port {
            tracing::info!(
                web_server_port = cfg.web_server_port,
                "webServerPort changed, takes effect on restart"
            );
        }

        let restart = cfg.osc_port != prev.config.osc_port;
        self.reconcile(slot, &cfg, restart).await;

        match self.config_frame() {
            Ok(frame) => {
                let report = self.realtime.broadcast(&frame);
                tracing::debug!(sent = report.sent, "config pushed to subscribers");
            }
            Err(e) => tracing::warn!(error = %e, "config frame encode failed"),
        }

        Ok(cfg)
    }

    /// Bring the listener in line with `cfg`: run iff enabled, on the
    /// configured port. `restart` forces a fresh bind even if running.
    async fn reconcile(
        &self,
        slot: &mut Option<ListenerHandle>,
        cfg: &RelayConfig,
        restart: bool,
    ) {
        let bind = SocketAddr::new(self.inner.opts.osc_bind_ip, cfg.osc_port);

        if !cfg.enabled {
            if let Some(h) = slot.take() {
                h.stop().await;
            }
            return;
        }

        let running_same = slot.as_ref().map(|h| h.bind_addr() == bind).unwrap_or(false);
        if running_same && !restart {
            return;
        }

        if let Some(h) = slot.take() {
            h.stop().await;
        }
        tracing::info!(%bind, "osc listener starting");
        *slot = Some(ListenerHandle::spawn(
            bind,
            self.inner.opts.bind_retry,
            self.inner.pipeline.clone(),
        ));
    }

    /// Write the config file; failure is logged and the in-memory config stands.
    fn persist(&self, cfg: &RelayConfig) {
        let Some(path) = &self.inner.opts.config_path else {
            return;
        };
        match config::save_to_file(path, cfg) {
            Ok(()) => self.metrics.config_writes.inc(&[("result", "ok")]),
            Err(e) => {
                self.metrics.config_writes.inc(&[("result", "error")]);
                tracing::error!(path = %path.display(), error = %e, "error saving config");
            }
        }
    }
}

fn config_frame_of(rt: &RuntimeConfig) -> Result<PreparedMsg> {
    Ok(PreparedMsg::text(ConfigFrame::new(&rt.config).to_json()?))
}

fn queue_frame(conn: &Connection, frame: PreparedMsg) -> Result<()> {
    conn.tx
        .try_send(frame.to_ws_message())
        .map_err(|_| OscRelayError::Internal("subscriber queue unavailable".into()))
}
