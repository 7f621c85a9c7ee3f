//! Chat bridge endpoint.
//!
//! `POST /api/chat` — forwards one chat turn to the agent CLI and relays the
//! agent's JSON response. The agent's response shape is opaque to this layer
//! (`{text, ui_action?}` by convention).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::bridge::{self, process::ScriptError, Relay};
use crate::routes::{json_body, relay_body};
use crate::AppState;

/// Request body for `POST /api/chat`. Both fields are required and must be
/// non-empty; the body is parsed leniently so a malformed document gets the
/// same 400 as missing fields.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: Option<String>,
}

/// `POST /api/chat` — forward a chat turn to the agent.
///
/// # Errors
///
/// - `400` `{"message":"Incomplete data."}` — body missing either field
/// - `500` `{"error":"Agent execution returned no output."}` — spawn failure
///   or blank stdout
/// - `504` `{"error":"Agent timed out."}` — run exceeded `exec_timeout_ms`
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let Some((session_id, message)) = parse_request(&body) else {
        return json_body(
            StatusCode::BAD_REQUEST,
            &json!({"message": "Incomplete data."}),
        );
    };

    // The agent sees both fields with double quotes removed. The argument
    // array carries everything else verbatim.
    let session_id = bridge::strip_quotes(&session_id);
    let message = bridge::strip_quotes(&message);

    let scripts = &state.config.scripts;
    let result = bridge::invoke_script(
        scripts,
        &scripts.agent,
        &["--session_id", &session_id, "--message", &message],
        state.config.server.exec_timeout_ms,
    )
    .await;

    match result {
        Ok(output) => match bridge::classify(&output.stdout) {
            // Valid JSON from the agent passes through untouched.
            Relay::Json(raw) => relay_body(raw),
            // Anything else (e.g. a traceback) is wrapped so the frontend
            // still receives a JSON document.
            Relay::Text(text) => json_body(StatusCode::OK, &json!({"text": text})),
            Relay::Empty => json_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"error": "Agent execution returned no output."}),
            ),
        },
        Err(ScriptError::Timeout) => json_body(
            StatusCode::GATEWAY_TIMEOUT,
            &json!({"error": "Agent timed out."}),
        ),
        Err(e) => {
            warn!("agent invocation failed: {e}");
            json_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"error": "Agent execution returned no output."}),
            )
        }
    }
}

/// Extract `(session_id, message)` from the raw body, rejecting blank fields.
fn parse_request(body: &[u8]) -> Option<(String, String)> {
    let req: ChatRequest = serde_json::from_slice(body).ok()?;
    let session_id = req.session_id.filter(|s| !s.trim().is_empty())?;
    let message = req.message.filter(|s| !s.trim().is_empty())?;
    Some((session_id, message))
}
