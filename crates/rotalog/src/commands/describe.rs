//! Describe command implementation - shows the resolved destination

use anyhow::Result;
use chrono::Utc;
use rotalog_core::OpenMode;
use rotalog_logs::LogDestination;
use serde::Serialize;
use std::fs;

use crate::cli::DestinationArgs;
use crate::output::{
    format_bytes, format_rollover, is_json_mode, print_json, print_row, print_rule,
};

#[derive(Serialize)]
struct DescribeJson {
    path: String,
    mode: OpenMode,
    max_bytes: u64,
    backup_count: usize,
    when: String,
    interval: u32,
    utc: bool,
    header: Option<String>,
    delay: bool,
    current_size: u64,
    next_rollover: Option<String>,
    backups: Vec<String>,
}

pub fn execute(args: DestinationArgs) -> Result<i32> {
    let config = super::resolve_config(&args)?;

    // Deferred open so describing never creates the log file
    let destination = LogDestination::open(config.clone().delay(true))?;
    let current_size = fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0);
    let next_rollover = format_rollover(destination.rollover_at(), config.utc);
    let backups: Vec<String> = destination
        .backups()?
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    if is_json_mode() {
        print_json(&DescribeJson {
            path: config.path.display().to_string(),
            mode: config.mode,
            max_bytes: config.max_bytes,
            backup_count: config.backup_count,
            when: config.when.to_string(),
            interval: config.interval,
            utc: config.utc,
            header: config.header.clone(),
            delay: config.delay,
            current_size,
            next_rollover,
            backups,
        });
        return Ok(0);
    }

    print_rule();
    print_row("Path", config.path.display());
    print_row("Mode", config.mode);
    print_row(
        "Max Size",
        if config.max_bytes > 0 {
            format_bytes(config.max_bytes)
        } else {
            "disabled".to_string()
        },
    );
    print_row("Backups", config.backup_count);
    print_row("Rollover", format!("every {} x {}", config.interval, config.when));
    print_row("Clock", if config.utc { "UTC" } else { "local" });
    if let Some(header) = &config.header {
        print_row("Header", header);
    }
    if config.delay {
        print_row("Open", "on first write");
    }
    print_rule();
    print_row("Current Size", format_bytes(current_size));
    print_row(
        "Next Rollover",
        next_rollover.unwrap_or_else(|| "disabled".to_string()),
    );
    print_row("Checked At", Utc::now().to_rfc3339());
    if backups.is_empty() {
        print_row("Archives", "none");
    } else {
        for backup in &backups {
            print_row("Archive", backup);
        }
    }
    print_rule();
    Ok(0)
}
