//! HTTP route handlers.
//!
//! Each sub-module corresponds to one endpoint. The handlers are independent
//! of each other; nothing is shared beyond [`AppState`] and the small
//! response helpers here.

pub mod availability;
pub mod chat;
pub mod health;
pub mod hotels;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;

use crate::AppState;

/// Content type on every response. The frontend expects the explicit charset.
pub(crate) const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Assemble the API routes. Layers (CORS, tracing) are applied by
/// [`crate::app`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/availability", get(availability::availability))
        .route("/api/hotels", get(hotels::hotels))
}

/// Serialize an owned payload with the explicit UTF-8 JSON content type.
pub(crate) fn json_body(status: StatusCode, value: &Value) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_UTF8)], value.to_string()).into_response()
}

/// Relay a raw JSON document produced by a collaborator script, byte for byte.
pub(crate) fn relay_body(raw: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, JSON_UTF8)], raw).into_response()
}
