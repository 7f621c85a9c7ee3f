//! Low-level subprocess invocation and output capture.
//!
//! Collaborator scripts are started with an explicit argument array via
//! [`run_capture`]; there is no shell between this service and the child, so
//! request fields can never be reinterpreted as command syntax. The child has
//! `kill_on_drop(true)` so a cancelled request does not leave an orphan behind.

use std::fmt::Write;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Max captured bytes per stream (1 MB).
///
/// Output beyond this limit is still drained from the pipe (to prevent
/// deadlocks) but discarded. A truncation notice is appended to the returned
/// string.
const MAX_SCRIPT_OUTPUT: usize = 1024 * 1024;

/// Run `program` with `args`, capture both output streams, and wait for exit.
///
/// Stdout and stderr are read concurrently (to avoid pipe deadlock) and each
/// capped at [`MAX_SCRIPT_OUTPUT`] bytes. The entire run is wrapped in a
/// `tokio::time::timeout`; on expiry the child is killed via drop.
///
/// `env` entries are merged into the inherited environment, not replacing it.
pub async fn run_capture(
    program: &str,
    args: &[&str],
    working_dir: &str,
    timeout_ms: u64,
    env: &[(&str, &str)],
) -> Result<ScriptOutput, ScriptError> {
    let start = std::time::Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in env {
        cmd.env(key, value);
    }
    let mut child = cmd
        .spawn()
        .map_err(|e| ScriptError::SpawnFailed(e.to_string()))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| ScriptError::ProcessFailed("Failed to take stdout pipe".to_string()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ScriptError::ProcessFailed("Failed to take stderr pipe".to_string()))?;

    let timeout = tokio::time::Duration::from_millis(timeout_ms);
    match tokio::time::timeout(timeout, async {
        // Read stdout and stderr concurrently to avoid pipe deadlock
        let (stdout_data, stderr_data) = tokio::join!(
            read_capped(&mut stdout, MAX_SCRIPT_OUTPUT),
            read_capped(&mut stderr, MAX_SCRIPT_OUTPUT),
        );
        // Drop pipe handles so the child sees EOF
        drop(stdout);
        drop(stderr);

        let status = child
            .wait()
            .await
            .map_err(|e| ScriptError::ProcessFailed(e.to_string()))?;

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        Ok::<_, ScriptError>(ScriptOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout_data,
            stderr: stderr_data,
            duration_ms,
        })
    })
    .await
    {
        Ok(result) => result,
        Err(_) => Err(ScriptError::Timeout),
    }
}

/// Read from an async reader, keeping the first `max_bytes` and discarding the
/// rest.
///
/// Reading continues past the cap instead of closing the pipe early, since
/// closing a pipe while the child is still writing causes SIGPIPE / broken
/// pipe errors and potential deadlocks when the child is also writing to the
/// other stream.
async fn read_capped(reader: &mut (impl tokio::io::AsyncRead + Unpin), max_bytes: usize) -> String {
    let mut buf = Vec::with_capacity(max_bytes.min(65536));
    let mut tmp = [0u8; 8192];
    let mut total_read = 0usize;
    loop {
        match reader.read(&mut tmp).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                total_read += n;
                if buf.len() < max_bytes {
                    let take = n.min(max_bytes - buf.len());
                    buf.extend_from_slice(&tmp[..take]);
                }
            }
        }
    }
    let mut s = String::from_utf8_lossy(&buf).into_owned();
    if total_read > max_bytes {
        let _ = write!(
            s,
            "\n[truncated: {total_read} bytes total, showing first {max_bytes}]"
        );
    }
    s
}

/// Successful result of [`run_capture`].
#[derive(Debug)]
pub struct ScriptOutput {
    /// Process exit code, or `-1` if unavailable (e.g. killed by signal).
    pub exit_code: i32,
    /// Captured stdout (capped at [`MAX_SCRIPT_OUTPUT`], lossy UTF-8 conversion).
    pub stdout: String,
    /// Captured stderr (capped at [`MAX_SCRIPT_OUTPUT`], lossy UTF-8 conversion).
    pub stderr: String,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

/// Errors that can occur during [`run_capture`].
#[derive(Debug)]
pub enum ScriptError {
    /// The program could not be started (e.g. not found, permission denied).
    SpawnFailed(String),
    /// The child started but `wait()` failed.
    ProcessFailed(String),
    /// The script exceeded its timeout and was killed.
    Timeout,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::SpawnFailed(e) => write!(f, "Failed to spawn script: {e}"),
            ScriptError::ProcessFailed(e) => write!(f, "Script process error: {e}"),
            ScriptError::Timeout => write!(f, "Script timed out"),
        }
    }
}
