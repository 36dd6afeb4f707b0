//! Axum router wiring.
//!
//! WebSocket subscribers may upgrade on `/` (what the browser UI uses) or `/ws`.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(transport::ws::ws_upgrade))
        .route("/ws", get(transport::ws::ws_upgrade))
        .route("/api/config", get(api::get_config).post(api::post_config))
        .route("/api/toggle", post(api::toggle))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
