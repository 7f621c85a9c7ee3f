//! Unauthenticated health-check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

use crate::routes::json_body;
use crate::AppState;

/// `GET /api/health` — liveness probe.
///
/// Returns status, uptime, and version. Suitable for load-balancer health
/// checks; does not touch the collaborator scripts.
pub async fn health(State(state): State<AppState>) -> Response {
    let uptime = state.start_time.elapsed().as_secs();
    json_body(
        StatusCode::OK,
        &json!({
            "status": "ok",
            "uptime_secs": uptime,
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
