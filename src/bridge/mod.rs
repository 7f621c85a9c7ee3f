//! Request-to-process bridging.
//!
//! Every endpoint does the same dance: validate input, invoke one
//! collaborator script, classify its stdout, relay. This module owns the
//! shared pieces: invoking a script through the configured interpreter,
//! classifying captured stdout, and the quote sanitization the chat contract
//! promises.

pub mod process;

use tracing::{debug, warn};

use crate::config::ScriptsConfig;
use process::{ScriptError, ScriptOutput};

/// Classification of a collaborator script's stdout.
#[derive(Debug)]
pub enum Relay {
    /// Stdout was blank after trimming. Every endpoint maps this to 500.
    Empty,
    /// A well-formed JSON document, ready to relay verbatim.
    Json(String),
    /// Non-empty output that is not JSON (e.g. an interpreter traceback).
    Text(String),
}

/// Classify raw stdout into [`Relay`].
///
/// The document itself is not interpreted; the scripts own their response
/// shapes. Parsing only establishes that the bytes are well-formed JSON.
pub fn classify(stdout: &str) -> Relay {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Relay::Empty;
    }
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        Relay::Json(trimmed.to_string())
    } else {
        Relay::Text(trimmed.to_string())
    }
}

/// Remove double-quote characters (not escape them).
///
/// The chat contract promises the agent sees its fields with `"` stripped.
/// Injection safety does not depend on this: arguments go to the child as an
/// array, never through a shell.
pub fn strip_quotes(input: &str) -> String {
    input.replace('"', "")
}

/// Invoke one collaborator script through the configured interpreter and
/// capture its output.
///
/// `PYTHONIOENCODING=utf-8` is merged into the child environment so script
/// output is valid UTF-8 regardless of locale.
pub async fn invoke_script(
    scripts: &ScriptsConfig,
    script: &str,
    args: &[&str],
    timeout_ms: u64,
) -> Result<ScriptOutput, ScriptError> {
    let mut argv: Vec<&str> = Vec::with_capacity(args.len() + 1);
    argv.push(script);
    argv.extend_from_slice(args);

    let output = process::run_capture(
        &scripts.python,
        &argv,
        &scripts.working_dir,
        timeout_ms,
        &[("PYTHONIOENCODING", "utf-8")],
    )
    .await?;

    if output.exit_code != 0 {
        warn!(
            script,
            exit_code = output.exit_code,
            stderr = %output.stderr.trim(),
            "collaborator script exited nonzero"
        );
    } else {
        debug!(
            script,
            duration_ms = output.duration_ms,
            stdout_bytes = output.stdout.len(),
            "collaborator script finished"
        );
    }

    Ok(output)
}
