//! Console output formatting

use chrono::{DateTime, Local, TimeZone, Utc};
use colored::Colorize;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// One `label │ value` row of a detail block
pub fn print_row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<14} │ {}", label.bold(), value);
}

pub fn print_rule() {
    println!("{}", "─".repeat(50));
}

/// RFC 3339 rendering of a rollover time, `None` when time rotation is off
pub fn format_rollover(ts: i64, utc: bool) -> Option<String> {
    if ts == i64::MAX {
        return None;
    }
    let instant: DateTime<Utc> = Utc.timestamp_opt(ts, 0).single()?;
    if utc {
        Some(instant.to_rfc3339())
    } else {
        Some(instant.with_timezone(&Local).to_rfc3339())
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else if bytes > 0 {
        format!("{}B", bytes)
    } else {
        "0B".to_string()
    }
}
