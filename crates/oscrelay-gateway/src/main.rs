//! oscrelay: OSC (UDP) -> WebSocket relay.
//!
//! - UDP listener on `oscPort` (when enabled): decode, filter, broadcast
//! - HTTP + WebSocket on `webServerPort`: `/api/config`, `/api/toggle`, `/` and `/ws`
//! - Config file from `OSCRELAY_CONFIG` (default `config.json`)

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tracing_subscriber::{fmt, EnvFilter};

use oscrelay_core::error::{OscRelayError, Result};
use oscrelay_gateway::app_state::{AppState, StateOptions};
use oscrelay_gateway::{config, router};

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "oscrelay failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path: PathBuf = std::env::var_os("OSCRELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let cfg = config::load_or_default(&path);
    let listen = SocketAddr::from((Ipv4Addr::UNSPECIFIED, cfg.web_server_port));

    let state = AppState::new(
        cfg,
        StateOptions {
            config_path: Some(path),
            ..Default::default()
        },
    )?;
    state.start().await;

    let app = router::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| OscRelayError::Internal(format!("bind {listen} failed: {e}")))?;

    tracing::info!(%listen, "web server listening");
    tracing::info!("WebSocket server available at ws://localhost:{}", listen.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| OscRelayError::Internal(format!("server failed: {e}")))?;

    state.shutdown().await;
    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed");
        std::future::pending::<()>().await;
    }
}
