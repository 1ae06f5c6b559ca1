//! Run command implementation - captures a child process's output

use anyhow::{Context, Result};
use rotalog_logs::{LogCapture, LogDestination, SharedDestination};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

use crate::cli::RunArgs;

/// Returns the child's exit code
pub async fn execute(args: RunArgs) -> Result<i32> {
    let config = super::resolve_config(&args.destination)?;
    let destination = SharedDestination::new(LogDestination::open(config)?);
    let capture = LogCapture::new(destination.clone()).with_echo(args.echo);

    let (program, rest) = args
        .command
        .split_first()
        .context("No command given after --")?;

    let mut child = Command::new(program)
        .args(rest)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;

    info!(command = %program, pid = ?child.id(), "Started process");

    let (stdout_handle, stderr_handle) =
        capture.spawn_capture(child.stdout.take(), child.stderr.take());
    let status = child.wait().await?;

    for handle in [stdout_handle, stderr_handle].into_iter().flatten() {
        let stats = handle.await?;
        if stats.failed > 0 {
            warn!(failed = stats.failed, lines = stats.lines, "Some output was not logged");
        }
    }
    destination.with(|d| d.close())?;

    // No code when the child was killed by a signal
    let code = status.code().unwrap_or(1);
    info!(command = %program, code, "Process exited");
    Ok(code)
}
