//! # concierged
//!
//! HTTP bridge for the hotel concierge agent.
//!
//! concierged accepts frontend requests, forwards each one to an external
//! collaborator script (the conversational agent CLI or one of two catalog
//! lookup scripts), and relays the script's stdout back to the client as
//! JSON. It owns no business logic: the agent, the availability computation,
//! and the hotel catalog all live in the scripts.
//!
//! ## API surface
//!
//! | Method | Path                | Description                             |
//! |--------|---------------------|-----------------------------------------|
//! | GET    | `/api/health`       | Liveness probe                          |
//! | POST   | `/api/chat`         | Forward a chat turn to the agent CLI    |
//! | GET    | `/api/availability` | Booked date ranges for one hotel        |
//! | GET    | `/api/hotels`       | Full hotel catalog                      |
//!
//! ## Architecture
//!
//! ```text
//! main.rs          — entry point, clap args, server startup, graceful shutdown
//! config.rs        — TOML + env-var configuration
//! state.rs         — shared AppState (config, start instant)
//! bridge/
//!   process.rs     — run_capture(): argv spawn, capped capture, timeout
//!   mod.rs         — invoke_script(), stdout classification, sanitization
//! routes/
//!   health.rs      — GET /api/health
//!   chat.rs        — POST /api/chat
//!   availability.rs — GET /api/availability
//!   hotels.rs      — GET /api/hotels
//! ```

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use concierged::{app, AppState, Config};

/// HTTP bridge between the hotel frontend and the concierge agent CLI.
#[derive(Parser)]
#[command(name = "concierged", version)]
struct Cli {
    /// Path to TOML config file.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    // Initialize tracing
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    info!("concierged v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Agent: {} {} (cwd {})",
        config.scripts.python, config.scripts.agent, config.scripts.working_dir
    );
    info!("Listening on {}", config.server.listen);

    let state = AppState::new(config);

    let listener = TcpListener::bind(&state.config.server.listen)
        .await
        .expect("Failed to bind");

    info!("Server ready");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Goodbye");
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to register SIGTERM");
        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT"),
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received SIGINT");
    }
}
