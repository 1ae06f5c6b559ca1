//! Rotate command implementation - forces a rollover

use anyhow::Result;
use chrono::Utc;
use rotalog_logs::LogDestination;
use serde::Serialize;

use crate::cli::DestinationArgs;
use crate::output::{format_rollover, is_json_mode, print_info, print_json, print_success};

#[derive(Serialize)]
struct RotateJson {
    archived: Option<String>,
    pruned: Vec<String>,
    next_rollover: Option<String>,
}

pub fn execute(args: DestinationArgs) -> Result<i32> {
    let config = super::resolve_config(&args)?;
    let utc = config.utc;
    // Bind lazily so a missing file stays missing after the rollover
    let mut destination = LogDestination::open(config.delay(true))?;

    let report = destination.rollover(Utc::now().timestamp())?;
    destination.close()?;

    let next_rollover = format_rollover(report.rollover_at, utc);
    if is_json_mode() {
        print_json(&RotateJson {
            archived: report.archived.map(|p| p.display().to_string()),
            pruned: report.pruned.iter().map(|p| p.display().to_string()).collect(),
            next_rollover,
        });
        return Ok(0);
    }

    match &report.archived {
        Some(archived) => print_success(&format!(
            "Rotated {} to {}",
            destination.path().display(),
            archived.display()
        )),
        None => print_info(&format!(
            "Nothing to rotate, {} does not exist",
            destination.path().display()
        )),
    }
    for pruned in &report.pruned {
        print_info(&format!("Removed old backup {}", pruned.display()));
    }
    Ok(0)
}
