//! Operational HTTP endpoints.
//!
//! - `/healthz` : process is up
//! - `/readyz`  : 200 once the OSC listener holds its socket, 503 while the
//!   relay is disabled or still (re)binding
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz(State(app): State<AppState>) -> Response {
    if let Some(addr) = app.osc_bound_now().await {
        return (StatusCode::OK, format!("listening on {addr}")).into_response();
    }
    let why = if app.runtime().config.enabled {
        "osc listener binding"
    } else {
        "relay disabled"
    };
    (StatusCode::SERVICE_UNAVAILABLE, why).into_response()
}

pub async fn metrics(State(app): State<AppState>) -> Response {
    let body = app.metrics().render(&app.metrics_extra());
    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], body).into_response()
}
