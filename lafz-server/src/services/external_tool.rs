//! External process invocation
//!
//! Runs a command to completion under a time budget. On timeout the child is
//! killed (`kill_on_drop`) before the error is returned.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{ApiError, ApiResult};

/// Bytes of stderr kept in error messages
const STDERR_TAIL_BYTES: usize = 2048;

/// Run `command` and fail unless it exits successfully within `timeout`
///
/// `tool` names the program in logs and errors.
pub async fn run_tool(tool: &str, mut command: Command, timeout: Duration) -> ApiResult<()> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(tool, command = ?command.as_std(), "Spawning external tool");

    let child = command.spawn().map_err(|e| ApiError::ExternalTool {
        tool: tool.to_string(),
        message: format!("failed to start: {}", e),
    })?;

    let started = std::time::Instant::now();
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| ApiError::ExternalTool {
            tool: tool.to_string(),
            message: e.to_string(),
        })?,
        Err(_) => {
            // The child future was dropped with the timeout, which kills it.
            return Err(ApiError::ToolTimeout {
                tool: tool.to_string(),
                seconds: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ApiError::ExternalTool {
            tool: tool.to_string(),
            message: format!("{}, stderr: {}", output.status, stderr_tail(&stderr)),
        });
    }

    tracing::debug!(
        tool,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "External tool finished"
    );
    Ok(())
}

fn stderr_tail(stderr: &str) -> &str {
    let trimmed = stderr.trim_end();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed;
    }
    let mut cut = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(cut) {
        cut += 1;
    }
    &trimmed[cut..]
}
