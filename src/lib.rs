#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]

//! concierged library — the HTTP bridge between the hotel frontend and the
//! concierge agent's command-line collaborators.
//!
//! Building blocks:
//! - `config` — TOML + env-var configuration
//! - `state` — shared application state
//! - `bridge` — argument-array script invocation and stdout classification
//! - `routes` — REST route handlers

pub mod bridge;
pub mod config;
pub mod routes;
pub mod state;

// Re-export key types at crate root for convenience.
pub use config::Config;
pub use state::AppState;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application: API routes with request tracing and the
/// allow-all CORS policy the frontend relies on.
pub fn app(state: AppState) -> Router {
    routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
