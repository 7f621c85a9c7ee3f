//! Configuration loading and defaults.
//!
//! Configuration is resolved in order of precedence (highest wins):
//!
//! 1. **Environment variables** — `CONCIERGED_LISTEN`, `CONCIERGED_PYTHON`,
//!    `CONCIERGED_SCRIPTS_DIR`
//! 2. **Config file** — path via `--config <path>`, or `concierged.toml` in CWD
//! 3. **Compiled defaults** — see each field's default value below
//!
//! The TOML file mirrors the struct hierarchy:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//! exec_timeout_ms = 30000
//!
//! [scripts]
//! python = "python3"
//! working_dir = "."
//! agent = "agent_cli.py"
//! availability = "get_availability.py"
//! hotels = "get_hotels.py"
//!
//! [logging]
//! level = "info"
//! ```

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scripts: ScriptsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (default `0.0.0.0:8080`).
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Timeout for collaborator script runs in milliseconds (default 30 000).
    /// A script that exceeds it is killed and the request answers 504.
    #[serde(default = "default_exec_timeout_ms")]
    pub exec_timeout_ms: u64,
}

/// The collaborator scripts this service bridges to.
///
/// Each endpoint invokes `<python> <script> [args]` directly (argument array,
/// no shell), with `working_dir` as the child's current directory so the
/// scripts find their database and data files.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsConfig {
    /// Python interpreter binary (default `python3`). Override with
    /// `CONCIERGED_PYTHON`.
    #[serde(default = "default_python")]
    pub python: String,
    /// Working directory the scripts run in (default `.`). Override with
    /// `CONCIERGED_SCRIPTS_DIR`.
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    /// Conversational agent CLI, takes `--session_id` and `--message`.
    #[serde(default = "default_agent_script")]
    pub agent: String,
    /// Availability lookup, takes `--hotel_id`.
    #[serde(default = "default_availability_script")]
    pub availability: String,
    /// Hotel catalog listing, takes no arguments.
    #[serde(default = "default_hotels_script")]
    pub hotels: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter level (default `info`). Overridden by `RUST_LOG` env var.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_exec_timeout_ms() -> u64 {
    30000
}
fn default_python() -> String {
    "python3".to_string()
}
fn default_working_dir() -> String {
    ".".to_string()
}
fn default_agent_script() -> String {
    "agent_cli.py".to_string()
}
fn default_availability_script() -> String {
    "get_availability.py".to_string()
}
fn default_hotels_script() -> String {
    "get_hotels.py".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            exec_timeout_ms: default_exec_timeout_ms(),
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            working_dir: default_working_dir(),
            agent: default_agent_script(),
            availability: default_availability_script(),
            hotels: default_hotels_script(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration with the precedence chain: env vars > file > defaults.
    ///
    /// If `path` is `Some`, reads that file (panics on failure). Otherwise looks
    /// for `concierged.toml` in the current directory, falling back to compiled
    /// defaults.
    pub fn load(path: Option<&str>) -> Self {
        let mut config = if let Some(p) = path {
            let content = std::fs::read_to_string(p)
                .unwrap_or_else(|e| panic!("Failed to read config file {p}: {e}"));
            toml::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse config file {p}: {e}"))
        } else if Path::new("concierged.toml").exists() {
            let content =
                std::fs::read_to_string("concierged.toml").expect("Failed to read concierged.toml");
            toml::from_str(&content).expect("Failed to parse concierged.toml")
        } else {
            Config::default()
        };

        // Env var overrides
        if let Ok(listen) = std::env::var("CONCIERGED_LISTEN") {
            config.server.listen = listen;
        }
        if let Ok(python) = std::env::var("CONCIERGED_PYTHON") {
            config.scripts.python = python;
        }
        if let Ok(dir) = std::env::var("CONCIERGED_SCRIPTS_DIR") {
            config.scripts.working_dir = dir;
        }

        config
    }
}
