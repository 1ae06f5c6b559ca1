//! Rotation triggers and the policy combining them

use rotalog_core::RotationConfig;

/// Everything a trigger may look at before a record is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationCheck {
    /// Bytes already in the active segment
    pub segment_size: u64,
    /// Bytes of the record about to be written
    pub pending: u64,
    /// Unix seconds
    pub now: i64,
    /// Next scheduled time rollover, unix seconds
    pub rollover_at: i64,
}

/// A single reason to rotate
pub trait Trigger: Send + Sync {
    fn is_due(&self, check: &RotationCheck) -> bool;

    fn is_enabled(&self) -> bool;
}

/// Fires when the pending record would push the segment past `max_bytes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeTrigger {
    max_bytes: u64,
}

impl SizeTrigger {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl Trigger for SizeTrigger {
    fn is_due(&self, check: &RotationCheck) -> bool {
        self.is_enabled() && check.segment_size.saturating_add(check.pending) > self.max_bytes
    }

    fn is_enabled(&self) -> bool {
        self.max_bytes > 0
    }
}

/// Fires once the scheduled rollover time has been reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTrigger {
    enabled: bool,
}

impl TimeTrigger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Trigger for TimeTrigger {
    fn is_due(&self, check: &RotationCheck) -> bool {
        self.enabled && check.now >= check.rollover_at
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Size OR time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    size: SizeTrigger,
    time: TimeTrigger,
}

impl RotationPolicy {
    pub fn new(size: SizeTrigger, time: TimeTrigger) -> Self {
        Self { size, time }
    }

    pub fn from_config(config: &RotationConfig) -> Self {
        Self::new(
            SizeTrigger::new(config.max_bytes),
            TimeTrigger::new(config.interval > 0),
        )
    }

    pub fn should_rotate(&self, check: &RotationCheck) -> bool {
        self.size.is_due(check) || self.time.is_due(check)
    }

    pub fn size(&self) -> &SizeTrigger {
        &self.size
    }

    pub fn time(&self) -> &TimeTrigger {
        &self.time
    }
}
