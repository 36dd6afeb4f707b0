//! Relay control surface.
//!
//! - `GET  /api/config` : current config
//! - `POST /api/config` : partial update, applied atomically
//! - `POST /api/toggle` : flip `enabled`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use oscrelay_core::error::{ClientCode, OscRelayError};

use crate::app_state::AppState;
use crate::config::{ConfigPatch, RelayConfig};

/// Error body: `{"success":false,"code":...,"error":...}`.
#[derive(Debug)]
pub struct ApiError(pub OscRelayError);

impl From<OscRelayError> for ApiError {
    fn from(e: OscRelayError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::MalformedPacket => StatusCode::BAD_REQUEST,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "success": false,
            "code": code.as_str(),
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn get_config(State(app): State<AppState>) -> Json<RelayConfig> {
    Json(app.cfg())
}

pub async fn post_config(
    State(app): State<AppState>,
    body: Result<Json<ConfigPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(patch) = body.map_err(|e| OscRelayError::BadRequest(e.body_text()))?;
    let cfg = app.apply_patch(&patch).await?;
    tracing::info!(enabled = cfg.enabled, osc_port = cfg.osc_port, "config updated");
    Ok(Json(json!({ "success": true, "config": cfg })).into_response())
}

pub async fn toggle(State(app): State<AppState>) -> Result<Response, ApiError> {
    let enabled = app.toggle().await?;
    tracing::info!(enabled, "relay toggled");
    Ok(Json(json!({ "success": true, "enabled": enabled })).into_response())
}
