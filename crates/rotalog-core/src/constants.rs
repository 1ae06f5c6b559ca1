//! Constants and default values for rotalog

use std::path::PathBuf;

/// Default rotalog home directory name
pub const ROTALOG_DIR: &str = ".rotalog";

/// Default log directory name
pub const LOGS_DIR: &str = "logs";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "rotalog.toml",
    "rotalog.config.toml",
    "rotalog.yaml",
    "rotalog.yml",
    "rotalog.config.yaml",
    "rotalog.json",
    "rotalog.config.json",
];

/// Default size threshold in bytes (~25MB)
pub const DEFAULT_MAX_BYTES: u64 = 26_209_999;

/// Default number of backups to keep
pub const DEFAULT_BACKUP_COUNT: usize = 100;

/// Default time unit (days)
pub const DEFAULT_WHEN: &str = "D";

/// Default number of time units between rollovers (one week of days)
pub const DEFAULT_INTERVAL: u32 = 7;

/// Highest numeric disambiguator tried for a backup name (`.001` ..= `.999`)
pub const MAX_BACKUP_INDEX: u32 = 999;

/// Clock shift applied across a DST transition.
///
/// Only correct for regions whose daylight saving offset is exactly one hour.
pub const DST_SHIFT_SECS: i64 = 3600;

pub const ONE_MINUTE_SECS: i64 = 60;
pub const ONE_HOUR_SECS: i64 = 60 * 60;
pub const ONE_DAY_SECS: i64 = 24 * ONE_HOUR_SECS;
pub const ONE_WEEK_SECS: i64 = 7 * ONE_DAY_SECS;

/// Get the rotalog home directory
pub fn rotalog_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(ROTALOG_DIR))
        .unwrap_or_else(|| PathBuf::from(ROTALOG_DIR))
}

/// Get the logs directory
pub fn logs_dir() -> PathBuf {
    rotalog_home().join(LOGS_DIR)
}

/// Get the log file path for a named destination
pub fn log_path(name: &str) -> PathBuf {
    logs_dir().join(format!("{}.log", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotalog_home() {
        let home = rotalog_home();
        assert!(home.to_string_lossy().contains(".rotalog"));
    }

    #[test]
    fn test_log_path() {
        let path = log_path("api");
        assert!(path.to_string_lossy().ends_with("logs/api.log"));
    }

    #[test]
    fn test_unit_constants() {
        assert_eq!(ONE_DAY_SECS, 86_400);
        assert_eq!(ONE_WEEK_SECS, 604_800);
    }
}
