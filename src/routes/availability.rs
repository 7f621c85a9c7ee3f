//! Hotel availability endpoint.
//!
//! `GET /api/availability?hotel_id=<id>` — relays the booked date ranges for
//! one hotel, as printed by the availability lookup script.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::bridge::{self, process::ScriptError, Relay};
use crate::routes::{json_body, relay_body};
use crate::AppState;

/// Query parameters for `GET /api/availability`.
#[derive(Deserialize)]
pub struct AvailabilityParams {
    pub hotel_id: Option<String>,
}

/// A hotel id is a single `[A-Za-z0-9_-]+` token. Anything else never reaches
/// the script.
fn valid_hotel_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// `GET /api/availability` — booked date ranges for one hotel.
///
/// # Errors
///
/// - `400` `{"error":"Missing hotel_id parameter."}` — param absent or empty
/// - `400` `{"error":"Invalid hotel_id format."}` — characters outside `[A-Za-z0-9_-]`
/// - `500` `{"error":"Failed to fetch availability."}` — spawn failure, blank
///   stdout, or stdout that is not well-formed JSON
/// - `504` `{"error":"Availability lookup timed out."}`
pub async fn availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Response {
    let Some(hotel_id) = params.hotel_id.filter(|s| !s.is_empty()) else {
        return json_body(
            StatusCode::BAD_REQUEST,
            &json!({"error": "Missing hotel_id parameter."}),
        );
    };
    if !valid_hotel_id(&hotel_id) {
        return json_body(
            StatusCode::BAD_REQUEST,
            &json!({"error": "Invalid hotel_id format."}),
        );
    }

    let scripts = &state.config.scripts;
    let result = bridge::invoke_script(
        scripts,
        &scripts.availability,
        &["--hotel_id", &hotel_id],
        state.config.server.exec_timeout_ms,
    )
    .await;

    match result {
        Ok(output) => match bridge::classify(&output.stdout) {
            Relay::Json(raw) => relay_body(raw),
            Relay::Text(_) => {
                // The script printed something, but not JSON. Never forward
                // malformed bytes to the client.
                warn!(%hotel_id, "availability script produced non-JSON output");
                fetch_failed()
            }
            Relay::Empty => fetch_failed(),
        },
        Err(ScriptError::Timeout) => json_body(
            StatusCode::GATEWAY_TIMEOUT,
            &json!({"error": "Availability lookup timed out."}),
        ),
        Err(e) => {
            warn!(%hotel_id, "availability invocation failed: {e}");
            fetch_failed()
        }
    }
}

fn fetch_failed() -> Response {
    json_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({"error": "Failed to fetch availability."}),
    )
}
