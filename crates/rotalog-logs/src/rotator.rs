//! Rollover execution: close, archive, prune, reopen, re-header

use rotalog_core::{Error, OpenMode, Result, RotationConfig, MAX_BACKUP_INDEX};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::header::HeaderInjector;
use crate::schedule::{RolloverScheduler, RolloverState};

/// What a rollover did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverReport {
    /// Where the closed segment went, `None` when there was no base file
    pub archived: Option<PathBuf>,
    /// Backups deleted by the retention policy, oldest first
    pub pruned: Vec<PathBuf>,
    /// Next scheduled time rollover
    pub rollover_at: i64,
}

/// Owns the active segment of one destination and rotates it
pub struct FileRotator {
    path: PathBuf,
    base_name: String,
    base_dir: PathBuf,
    stream: Option<BufWriter<File>>,
    size: u64,
    backup_count: usize,
    delay: bool,
    header: Option<String>,
    /// Mode for the next lazy open
    open_mode: OpenMode,
    scheduler: RolloverScheduler,
    state: RolloverState,
    fs: Arc<dyn FileSystem>,
}

impl FileRotator {
    /// Build a rotator and, unless opening is deferred, open the first segment.
    ///
    /// The schedule starts from the modification time of an existing base
    /// file so a segment left over from an earlier run keeps its age.
    pub fn new(
        config: &RotationConfig,
        scheduler: RolloverScheduler,
        fs: Arc<dyn FileSystem>,
        now: i64,
    ) -> Result<Self> {
        config.validate()?;
        let base_name = config
            .base_name()
            .ok_or_else(|| Error::config("Log path has no file name"))?;

        let start = fs
            .stat(&config.path)
            .map(|stat| stat.modified.min(now))
            .unwrap_or(now);
        let state = scheduler.initial_state(start);

        let mut rotator = Self {
            path: config.path.clone(),
            base_name,
            base_dir: config.base_dir().to_path_buf(),
            stream: None,
            size: 0,
            backup_count: config.backup_count,
            delay: config.delay,
            header: config.header.clone(),
            open_mode: config.initial_open_mode(),
            scheduler,
            state,
            fs,
        };

        if !rotator.delay {
            rotator.open_segment(rotator.open_mode)?;
        }
        Ok(rotator)
    }

    /// Open the base file. An empty segment receives the header first.
    pub fn open_segment(&mut self, mode: OpenMode) -> Result<()> {
        let file = self.fs.open(&self.path, mode)?;
        let mut size = file.metadata()?.len();
        let mut writer = BufWriter::new(file);

        if size == 0 {
            if let Some(header) = &self.header {
                size += HeaderInjector::write(&mut writer, header)?;
                writer.flush()?;
            }
        }

        debug!(path = %self.path.display(), size, mode = %mode, "Opened log segment");
        self.stream = Some(writer);
        self.size = size;
        self.open_mode = OpenMode::Append;
        Ok(())
    }

    /// Open the base file if the destination is unbound
    pub fn ensure_open(&mut self) -> Result<()> {
        if self.stream.is_none() {
            self.open_segment(self.open_mode)?;
        }
        Ok(())
    }

    /// Append bytes to the active segment, opening it first if needed
    pub fn write(&mut self, record: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if let Some(writer) = self.stream.as_mut() {
            writer.write_all(record)?;
            writer.flush()?;
            self.size += record.len() as u64;
        }
        Ok(())
    }

    /// Flush and drop the stream, leaving the destination unbound
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.stream.take() {
            self.size = 0;
            writer.flush()?;
        }
        Ok(())
    }

    /// Rotate the active segment.
    ///
    /// Filesystem errors propagate. A failure before the rename leaves the
    /// segment in place. Once the segment is archived the schedule advances,
    /// so a later failure in pruning or reopening never archives it twice; the
    /// destination stays unbound and the next write opens it again.
    pub fn rollover(&mut self, now: i64) -> Result<RolloverReport> {
        self.close()?;

        let dfn = self.archive_base(now);
        let archived = if self.fs.exists(&self.path) {
            Some(self.archive(&dfn)?)
        } else {
            None
        };

        self.state.rollover_at = self.scheduler.compute_next(now);
        self.open_mode = OpenMode::Append;

        let pruned = if self.backup_count > 0 {
            self.prune()?
        } else {
            Vec::new()
        };

        if !self.delay {
            self.open_segment(OpenMode::Truncate)?;
        }

        info!(
            path = %self.path.display(),
            archived = ?archived,
            pruned = pruned.len(),
            next_rollover = self.state.rollover_at,
            "Rolled over log segment"
        );

        Ok(RolloverReport {
            archived,
            pruned,
            rollover_at: self.state.rollover_at,
        })
    }

    /// Existing backups, oldest first
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        let prefix = format!("{}.", self.base_name);
        let pattern = self.scheduler.when().suffix_regex();

        let mut backups: Vec<PathBuf> = self
            .fs
            .list_dir(&self.base_dir)?
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix(prefix.as_str()))
                    .map(|rest| pattern.is_match(rest))
                    .unwrap_or(false)
            })
            .collect();
        backups.sort();
        Ok(backups)
    }

    /// `<base>.<timestamp>` for the segment being closed
    fn archive_base(&self, now: i64) -> PathBuf {
        let suffix = self.scheduler.archive_suffix(self.state.rollover_at, now);
        let mut name: OsString = self.path.clone().into_os_string();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Move the base file to its archive name
    fn archive(&self, dfn: &Path) -> Result<PathBuf> {
        if self.backup_count == 0 {
            if self.fs.exists(dfn) {
                self.fs.remove(dfn)?;
            }
            self.fs.rename(&self.path, dfn)?;
            return Ok(dfn.to_path_buf());
        }

        let target = self.free_backup_name(dfn)?;
        self.fs.rename(&self.path, &target)?;
        Ok(target)
    }

    /// Next free `<dfn>.NNN`, numbered above every existing backup of `dfn`
    /// so that index order stays age order after pruning. When the top index
    /// is taken the surviving backups are renumbered down from 001 first.
    fn free_backup_name(&self, dfn: &Path) -> Result<PathBuf> {
        let indices = self.backup_indices(dfn)?;
        let mut highest = indices.last().copied().unwrap_or(0);
        if highest >= MAX_BACKUP_INDEX {
            highest = self.compact_backups(dfn, &indices)?;
        }

        for index in (highest + 1)..=MAX_BACKUP_INDEX {
            let candidate = numbered(dfn, index);
            if !self.fs.exists(&candidate) {
                return Ok(candidate);
            }
        }
        Err(Error::NamingCollision {
            base: dfn.to_path_buf(),
            attempts: MAX_BACKUP_INDEX,
        })
    }

    /// Indices of the existing `<dfn>.NNN` backups, ascending
    fn backup_indices(&self, dfn: &Path) -> Result<Vec<u32>> {
        let prefix = dfn
            .file_name()
            .map(|n| format!("{}.", n.to_string_lossy()))
            .unwrap_or_default();
        let mut indices: Vec<u32> = self
            .backups()?
            .iter()
            .filter_map(|p| {
                p.file_name()?
                    .to_str()?
                    .strip_prefix(prefix.as_str())?
                    .parse::<u32>()
                    .ok()
            })
            .collect();
        indices.sort_unstable();
        Ok(indices)
    }

    /// Renumber `<dfn>.NNN` backups to 001..=n keeping their order. Returns n.
    fn compact_backups(&self, dfn: &Path, indices: &[u32]) -> Result<u32> {
        let mut slot = 0;
        for &index in indices {
            slot += 1;
            if slot != index {
                self.fs.rename(&numbered(dfn, index), &numbered(dfn, slot))?;
            }
        }
        debug!(base = %dfn.display(), backups = slot, "Renumbered backups");
        Ok(slot)
    }

    /// Delete the oldest backups until at most `backup_count` remain
    fn prune(&self) -> Result<Vec<PathBuf>> {
        let backups = self.backups()?;
        if backups.len() <= self.backup_count {
            return Ok(Vec::new());
        }

        let excess = backups.len() - self.backup_count;
        let doomed: Vec<PathBuf> = backups.into_iter().take(excess).collect();
        for path in &doomed {
            self.fs.remove(path)?;
            debug!(path = %path.display(), "Removed old backup");
        }
        Ok(doomed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the active segment, header included
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn rollover_at(&self) -> i64 {
        self.state.rollover_at
    }

    pub fn state(&self) -> &RolloverState {
        &self.state
    }

    pub fn scheduler(&self) -> &RolloverScheduler {
        &self.scheduler
    }
}

/// `<dfn>.NNN`
fn numbered(dfn: &Path, index: u32) -> PathBuf {
    let mut name = dfn.as_os_str().to_os_string();
    name.push(format!(".{:03}", index));
    PathBuf::from(name)
}
