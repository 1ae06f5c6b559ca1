//! Test doubles for the filesystem and the wall clock

use chrono::{NaiveDateTime, TimeZone, Utc};
use rotalog_core::OpenMode;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::fs::{FileStat, FileSystem, StdFs};
use crate::schedule::Zone;

/// A zone with a fixed standard offset and a single one-hour DST window
#[derive(Debug, Clone, Copy)]
pub struct DstZone {
    /// Seconds east of UTC outside DST
    std_offset: i64,
    /// First instant of DST, unix seconds
    dst_start: i64,
    /// First instant after DST, unix seconds
    dst_end: i64,
}

impl DstZone {
    pub fn new(std_offset: i64, dst_start: i64, dst_end: i64) -> Self {
        Self {
            std_offset,
            dst_start,
            dst_end,
        }
    }
}

impl Zone for DstZone {
    fn local(&self, ts: i64) -> NaiveDateTime {
        let offset = self.std_offset + if self.is_dst(ts) { 3600 } else { 0 };
        Utc.timestamp_opt(ts + offset, 0)
            .single()
            .unwrap_or_default()
            .naive_utc()
    }

    fn is_dst(&self, ts: i64) -> bool {
        ts >= self.dst_start && ts < self.dst_end
    }
}

/// The real filesystem with switchable failures
#[derive(Debug, Default)]
pub struct FlakyFs {
    fail_open: AtomicBool,
    fail_rename: AtomicBool,
    fail_remove: AtomicBool,
    opens: AtomicUsize,
}

impl FlakyFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every open fail until switched back
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Make every rename fail until switched back
    pub fn set_fail_rename(&self, fail: bool) {
        self.fail_rename.store(fail, Ordering::SeqCst);
    }

    /// Make every file removal fail until switched back
    pub fn set_fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Number of successful opens
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl FileSystem for FlakyFs {
    fn exists(&self, path: &Path) -> bool {
        StdFs.exists(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "remove refused"));
        }
        StdFs.remove(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fail_rename.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "rename refused"));
        }
        StdFs.rename(from, to)
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        StdFs.create_dir_all(dir)
    }

    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<File> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "open refused"));
        }
        let file = StdFs.open(path, mode)?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(file)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        StdFs.list_dir(dir)
    }

    fn stat(&self, path: &Path) -> Option<FileStat> {
        StdFs.stat(path)
    }
}
