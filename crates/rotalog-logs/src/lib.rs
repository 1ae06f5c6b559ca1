//! rotalog Logs - Size and time based rotation of log files

mod capture;
mod destination;
mod fs;
mod header;
pub mod mock;
mod policy;
mod rotator;
mod schedule;

pub use capture::{CaptureStats, LogCapture};
pub use destination::{DestinationBuilder, LogDestination, SharedDestination};
pub use fs::{FileStat, FileSystem, StdFs};
pub use header::HeaderInjector;
pub use policy::{RotationPolicy, RotationCheck, SizeTrigger, TimeTrigger, Trigger};
pub use rotator::{FileRotator, RolloverReport};
pub use schedule::{LocalZone, RolloverScheduler, RolloverState, UtcZone, Zone};

use rotalog_core::constants;
use std::path::PathBuf;

/// Default location for a named destination
pub fn default_path(name: &str) -> PathBuf {
    constants::log_path(name)
}

