//! PSI binary invocation.
//!
//! Runs the external PSI binary against a workspace's files and
//! captures its output. The argument shape is part of the contract
//! with the binary and must not change:
//!
//! ```text
//! <binary> <sender_path> <receiver_path> --config <config_path>
//! ```

use crate::error::{CoreError, Result};
use crate::workspace::Workspace;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Maximum bytes of stderr/stdout carried in a failure detail.
pub(crate) const MAX_DETAIL_SIZE: usize = 16 * 1024;

/// Captured result of one PSI binary run.
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit code of the child, -1 if killed by signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Run the PSI binary against the workspace and wait for it to exit.
///
/// Blocks the calling task for as long as the computation takes, up to
/// `timeout`. On expiry the child is killed and
/// [`CoreError::ComputationTimeout`] is returned. A non-zero exit
/// becomes [`CoreError::ComputationFailed`] carrying stderr (or stdout
/// when stderr is empty). No retry is attempted: the PSI protocol may
/// be stateful across its own rounds, so a failed run is surfaced to
/// the caller as-is.
pub async fn invoke(
    binary: &Path,
    workspace: &Workspace,
    timeout: Option<Duration>,
) -> Result<ProcessOutput> {
    debug!(
        workspace_id = %workspace.id(),
        binary = %binary.display(),
        "Invoking PSI binary"
    );
    let start = std::time::Instant::now();

    let mut cmd = Command::new(binary);
    cmd.arg(workspace.sender_path())
        .arg(workspace.receiver_path())
        .arg("--config")
        .arg(workspace.config_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        warn!(workspace_id = %workspace.id(), error = %e, "Failed to spawn PSI binary");
        CoreError::LaunchFailed(e)
    })?;

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    workspace_id = %workspace.id(),
                    timeout_secs = limit.as_secs(),
                    "PSI computation timed out, child killed"
                );
                return Err(CoreError::ComputationTimeout(limit));
            }
        },
        None => child.wait_with_output().await,
    }
    .map_err(CoreError::LaunchFailed)?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    debug!(
        workspace_id = %workspace.id(),
        exit_code,
        stdout_len = stdout.len(),
        stderr_len = stderr.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "PSI binary exited"
    );

    if !output.status.success() {
        let detail = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr
        };
        return Err(CoreError::ComputationFailed {
            exit_code,
            detail: truncate_detail(detail, MAX_DETAIL_SIZE),
        });
    }

    Ok(ProcessOutput {
        exit_code,
        stdout,
        stderr,
    })
}

/// Truncate a diagnostic string to max bytes, preserving UTF-8 boundaries.
pub(crate) fn truncate_detail(s: String, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = s[..end].to_string();
    truncated.push_str("\n... [truncated]");
    truncated
}
