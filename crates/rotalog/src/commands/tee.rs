//! Tee command implementation - copies stdin lines into a rotating log

use anyhow::{bail, Result};
use rotalog_logs::{LogCapture, LogDestination, SharedDestination};
use tracing::info;

use crate::cli::TeeArgs;

pub async fn execute(args: TeeArgs) -> Result<i32> {
    let config = super::resolve_config(&args.destination)?;
    let path = config.path.clone();
    let destination = SharedDestination::new(LogDestination::open(config)?);

    let capture = LogCapture::new(destination.clone()).with_echo(args.echo);
    let stats = capture.spawn_pipe(tokio::io::stdin()).await?;
    destination.with(|d| d.close())?;

    info!(path = %path.display(), lines = stats.lines, "Stdin closed");
    if stats.failed > 0 {
        bail!(
            "{} of {} lines could not be written to {}",
            stats.failed,
            stats.lines,
            path.display()
        );
    }
    Ok(0)
}
