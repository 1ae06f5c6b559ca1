//! Core types for rotalog

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::*;
use crate::error::{Error, Result};

static SECONDS_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}(\.\d{3})?$")
        .expect("Invalid seconds suffix regex")
});

static MINUTES_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}(\.\d{3})?$").expect("Invalid minutes suffix regex")
});

static HOURS_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}(\.\d{3})?$").expect("Invalid hours suffix regex")
});

static DAYS_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(\.\d{3})?$").expect("Invalid days suffix regex")
});

/// Time unit driving the time trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum When {
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
    /// Rollover at local (or UTC) midnight
    Midnight,
    /// Rollover at the midnight ending the given weekday (0 = Monday)
    Weekday(u8),
}

impl When {
    /// Length of one unit in seconds
    pub fn unit_secs(&self) -> i64 {
        match self {
            When::Seconds => 1,
            When::Minutes => ONE_MINUTE_SECS,
            When::Hours => ONE_HOUR_SECS,
            When::Days | When::Midnight => ONE_DAY_SECS,
            When::Weekday(_) => ONE_WEEK_SECS,
        }
    }

    /// strftime template used to name archived segments
    pub fn suffix(&self) -> &'static str {
        match self {
            When::Seconds => "%Y-%m-%d_%H-%M-%S",
            When::Minutes => "%Y-%m-%d_%H-%M",
            When::Hours => "%Y-%m-%d_%H",
            When::Days | When::Midnight | When::Weekday(_) => "%Y-%m-%d",
        }
    }

    /// Pattern matching what follows `<base>.` in a backup file name
    pub fn suffix_regex(&self) -> &'static Regex {
        match self {
            When::Seconds => &SECONDS_SUFFIX_REGEX,
            When::Minutes => &MINUTES_SUFFIX_REGEX,
            When::Hours => &HOURS_SUFFIX_REGEX,
            When::Days | When::Midnight | When::Weekday(_) => &DAYS_SUFFIX_REGEX,
        }
    }

    /// Midnight and weekly rollovers follow the calendar rather than a fixed period
    pub fn is_calendar_aligned(&self) -> bool {
        matches!(self, When::Midnight | When::Weekday(_))
    }
}

impl std::fmt::Display for When {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            When::Seconds => write!(f, "S"),
            When::Minutes => write!(f, "M"),
            When::Hours => write!(f, "H"),
            When::Days => write!(f, "D"),
            When::Midnight => write!(f, "MIDNIGHT"),
            When::Weekday(day) => write!(f, "W{}", day),
        }
    }
}

impl FromStr for When {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "S" => Ok(When::Seconds),
            "M" => Ok(When::Minutes),
            "H" => Ok(When::Hours),
            "D" => Ok(When::Days),
            "MIDNIGHT" => Ok(When::Midnight),
            w if w.starts_with('W') => {
                let day: u8 = w[1..].parse().map_err(|_| {
                    Error::config(format!("Invalid weekday in rollover unit: {}", s))
                })?;
                if day > 6 {
                    return Err(Error::config(format!(
                        "Invalid weekday {} in rollover unit (expected W0-W6)",
                        day
                    )));
                }
                Ok(When::Weekday(day))
            }
            _ => Err(Error::config(format!(
                "Invalid rollover unit: {}. Expected S, M, H, D, MIDNIGHT or W0-W6",
                s
            ))),
        }
    }
}

/// How the base file is opened when a destination is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OpenMode {
    #[default]
    Append,
    Truncate,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::Append => "append",
            OpenMode::Truncate => "truncate",
        }
    }
}

impl std::fmt::Display for OpenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "a" | "append" => Ok(OpenMode::Append),
            "w" | "truncate" => Ok(OpenMode::Truncate),
            _ => Err(Error::config(format!(
                "Invalid open mode: {}. Expected append or truncate",
                s
            ))),
        }
    }
}

impl TryFrom<String> for OpenMode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Rotation configuration for one log destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Base file path of the active segment
    pub path: PathBuf,
    pub mode: OpenMode,
    /// Size threshold in bytes, 0 disables the size trigger
    pub max_bytes: u64,
    /// Backups to keep, 0 switches to overwrite mode
    pub backup_count: usize,
    pub when: When,
    /// Units between time rollovers, 0 disables the time trigger
    pub interval: u32,
    pub utc: bool,
    /// Written as the first line of every segment
    pub header: Option<String>,
    /// Defer opening the file until the first write
    pub delay: bool,
}

impl RotationConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: OpenMode::Append,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            when: When::Days,
            interval: DEFAULT_INTERVAL,
            utc: false,
            header: None,
            delay: false,
        }
    }

    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn backup_count(mut self, backup_count: usize) -> Self {
        self.backup_count = backup_count;
        self
    }

    pub fn when(mut self, when: When, interval: u32) -> Self {
        self.when = when;
        self.interval = interval;
        self
    }

    pub fn utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn header<S: Into<String>>(mut self, header: S) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn delay(mut self, delay: bool) -> Self {
        self.delay = delay;
        self
    }

    /// Seconds between time rollovers (0 when the time trigger is disabled)
    pub fn interval_secs(&self) -> i64 {
        self.when.unit_secs() * i64::from(self.interval)
    }

    /// Mode used for the first open. Size rotation always appends so a restart
    /// never wipes a segment that is still below the threshold.
    pub fn initial_open_mode(&self) -> OpenMode {
        if self.max_bytes > 0 {
            OpenMode::Append
        } else {
            self.mode
        }
    }

    /// File name of the base path
    pub fn base_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Directory holding the base file and its backups
    pub fn base_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Validate the configuration before a destination is built from it
    pub fn validate(&self) -> Result<()> {
        if self.base_name().is_none() {
            return Err(Error::config(format!(
                "Log path has no file name: {}",
                self.path.display()
            )));
        }
        if let When::Weekday(day) = self.when {
            if day > 6 {
                return Err(Error::config(format!(
                    "Invalid weekday {} (expected 0-6, Monday = 0)",
                    day
                )));
            }
        }
        if let Some(header) = &self.header {
            if header.contains('\n') {
                return Err(Error::config("Header must be a single line"));
            }
        }
        Ok(())
    }
}
