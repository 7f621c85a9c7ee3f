//! Hotel catalog endpoint.
//!
//! `GET /api/hotels` — relays the full hotel list printed by the catalog
//! script. Takes no input.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use tracing::warn;

use crate::bridge::{self, process::ScriptError, Relay};
use crate::routes::{json_body, relay_body};
use crate::AppState;

/// `GET /api/hotels` — full hotel catalog.
///
/// # Errors
///
/// - `500` `{"error":"Failed to fetch hotels"}` — spawn failure, blank stdout,
///   or stdout that is not well-formed JSON
/// - `504` `{"error":"Hotel listing timed out."}`
pub async fn hotels(State(state): State<AppState>) -> Response {
    let scripts = &state.config.scripts;
    let result = bridge::invoke_script(
        scripts,
        &scripts.hotels,
        &[],
        state.config.server.exec_timeout_ms,
    )
    .await;

    match result {
        Ok(output) => match bridge::classify(&output.stdout) {
            Relay::Json(raw) => relay_body(raw),
            Relay::Text(_) => {
                warn!("hotels script produced non-JSON output");
                fetch_failed()
            }
            Relay::Empty => fetch_failed(),
        },
        Err(ScriptError::Timeout) => json_body(
            StatusCode::GATEWAY_TIMEOUT,
            &json!({"error": "Hotel listing timed out."}),
        ),
        Err(e) => {
            warn!("hotels invocation failed: {e}");
            fetch_failed()
        }
    }
}

fn fetch_failed() -> Response {
    json_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({"error": "Failed to fetch hotels"}),
    )
}
