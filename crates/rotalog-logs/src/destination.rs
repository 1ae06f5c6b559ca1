//! Rotating log destination

use chrono::Utc;
use parking_lot::Mutex;
use rotalog_core::{Result, RotationConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::{FileSystem, StdFs};
use crate::policy::{RotationPolicy, RotationCheck};
use crate::rotator::{FileRotator, RolloverReport};
use crate::schedule::{RolloverScheduler, Zone};

/// Builds a [`LogDestination`] with optional filesystem and clock overrides
pub struct DestinationBuilder {
    config: RotationConfig,
    fs: Arc<dyn FileSystem>,
    zone: Option<Arc<dyn Zone>>,
}

impl DestinationBuilder {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            fs: Arc::new(StdFs),
            zone: None,
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Wall clock for local-time schedules
    pub fn with_zone(mut self, zone: Arc<dyn Zone>) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn open(self) -> Result<LogDestination> {
        self.open_at(Utc::now().timestamp())
    }

    pub fn open_at(self, now: i64) -> Result<LogDestination> {
        self.config.validate()?;

        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }

        let mut scheduler = RolloverScheduler::from_config(&self.config);
        if let Some(zone) = self.zone {
            scheduler = scheduler.with_zone(zone);
        }

        let rotator = FileRotator::new(&self.config, scheduler, self.fs, now)?;
        Ok(LogDestination {
            policy: RotationPolicy::from_config(&self.config),
            rotator,
            config: self.config,
        })
    }
}

/// A log file rotated by size and by time.
///
/// Callers must serialize access; [`SharedDestination`] does that with a mutex.
pub struct LogDestination {
    config: RotationConfig,
    policy: RotationPolicy,
    rotator: FileRotator,
}

impl LogDestination {
    pub fn builder(config: RotationConfig) -> DestinationBuilder {
        DestinationBuilder::new(config)
    }

    /// Open with the real filesystem and clock
    pub fn open(config: RotationConfig) -> Result<Self> {
        DestinationBuilder::new(config).open()
    }

    /// Whether writing `pending` bytes at `now` requires a rollover first
    pub fn should_rotate(&self, pending: u64, now: i64) -> bool {
        self.policy.should_rotate(&RotationCheck {
            segment_size: self.rotator.size(),
            pending,
            now,
            rollover_at: self.rotator.rollover_at(),
        })
    }

    /// Write a formatted record
    pub fn emit(&mut self, record: &[u8]) -> Result<()> {
        self.emit_at(record, Utc::now().timestamp())
    }

    pub fn emit_at(&mut self, record: &[u8], now: i64) -> Result<()> {
        // An unbound destination opens first so the size check sees the real segment
        self.rotator.ensure_open()?;
        if self.should_rotate(record.len() as u64, now) {
            self.rotator.rollover(now)?;
        }
        self.rotator.write(record)
    }

    /// Write a line, adding the terminator
    pub fn emit_line(&mut self, line: &str) -> Result<()> {
        self.emit_line_at(line, Utc::now().timestamp())
    }

    pub fn emit_line_at(&mut self, line: &str, now: i64) -> Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');
        self.emit_at(&record, now)
    }

    /// Rotate now regardless of the triggers
    pub fn rollover(&mut self, now: i64) -> Result<RolloverReport> {
        self.rotator.rollover(now)
    }

    /// Flush and release the file; the next emit reopens it
    pub fn close(&mut self) -> Result<()> {
        self.rotator.close()
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        self.rotator.path()
    }

    pub fn current_size(&self) -> u64 {
        self.rotator.size()
    }

    pub fn is_open(&self) -> bool {
        self.rotator.is_open()
    }

    pub fn rollover_at(&self) -> i64 {
        self.rotator.rollover_at()
    }

    pub fn scheduler(&self) -> &RolloverScheduler {
        self.rotator.scheduler()
    }

    /// Existing backups, oldest first
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        self.rotator.backups()
    }
}

/// A destination shared between writers, one lock per destination
#[derive(Clone)]
pub struct SharedDestination {
    inner: Arc<Mutex<LogDestination>>,
}

impl SharedDestination {
    pub fn new(destination: LogDestination) -> Self {
        Self {
            inner: Arc::new(Mutex::new(destination)),
        }
    }

    pub fn emit(&self, record: &[u8]) -> Result<()> {
        self.inner.lock().emit(record)
    }

    pub fn emit_line(&self, line: &str) -> Result<()> {
        self.inner.lock().emit_line(line)
    }

    pub fn rollover(&self, now: i64) -> Result<RolloverReport> {
        self.inner.lock().rollover(now)
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut LogDestination) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
