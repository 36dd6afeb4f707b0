//! WebSocket subscriber session.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Push the current config, then register as a broadcast subscriber
//! - Single writer task fed by a bounded queue (broadcast never awaits a socket)
//! - Lifecycle: ping + idle timeout, unregister on exit
//!
//! The channel is one-way. Text/binary frames from the browser are ignored.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use oscrelay_core::error::Result;

use crate::app_state::AppState;
use crate::realtime::Connection;

/// Outbound frames buffered per subscriber before broadcasts start dropping.
const OUTBOUND_QUEUE: usize = 1024;
const PING_INTERVAL: Duration = Duration::from_secs(20);
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(app, socket).await {
            tracing::debug!(error = %e, "subscriber session ended with error");
        }
    })
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, socket: WebSocket) -> Result<()> {
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
    let (mut ws_tx, mut ws_rx) = socket.split();

    // config goes first so it precedes every envelope on this subscriber's queue
    let id = app.subscribe(Connection { tx: out_tx.clone() })?;
    let realtime = app.realtime();
    tracing::info!(subscriber = id, total = realtime.subscribers.len(), "WebSocket client connected");

    let mut ping_tick = tokio::time::interval(PING_INTERVAL);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                last_activity = Instant::now();

                match msg {
                    Message::Text(_) | Message::Binary(_) => {
                        tracing::debug!(subscriber = id, "ignoring inbound subscriber frame");
                    }
                    Message::Ping(payload) => {
                        let _ = out_tx.try_send(Message::Pong(payload));
                    }
                    Message::Pong(_) => {}
                    Message::Close(_) => break,
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = tokio::time::sleep_until(last_activity + IDLE_TIMEOUT) => {
                tracing::debug!(subscriber = id, "idle timeout");
                break;
            }
        }
    }

    realtime.subscribers.remove(id);
    let _ = ws_tx.close().await;
    tracing::info!(subscriber = id, "WebSocket client disconnected");
    Ok(())
}
