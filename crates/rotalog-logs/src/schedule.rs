//! Rollover scheduling with daylight saving compensation
//!
//! All functions take `now` explicitly (unix seconds). Wall-clock reads happen
//! only at the outer `emit` boundary, so the arithmetic here is deterministic
//! and can be driven by a custom [`Zone`].

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use rotalog_core::{RotationConfig, When, DST_SHIFT_SECS, ONE_DAY_SECS};
use std::fmt;
use std::sync::Arc;

/// Wall clock used to align and name rollovers
pub trait Zone: Send + Sync + fmt::Debug {
    /// Broken-down wall-clock time for a unix timestamp
    fn local(&self, ts: i64) -> NaiveDateTime;

    /// Whether daylight saving time is in effect at `ts`
    fn is_dst(&self, ts: i64) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UtcZone;

impl Zone for UtcZone {
    fn local(&self, ts: i64) -> NaiveDateTime {
        utc_naive(ts)
    }

    fn is_dst(&self, _ts: i64) -> bool {
        false
    }
}

/// The system time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalZone;

impl LocalZone {
    fn offset_at(ts: i64) -> Option<i32> {
        Local
            .timestamp_opt(ts, 0)
            .single()
            .map(|dt| dt.offset().local_minus_utc())
    }
}

impl Zone for LocalZone {
    fn local(&self, ts: i64) -> NaiveDateTime {
        match Local.timestamp_opt(ts, 0).single() {
            Some(dt) => dt.naive_local(),
            None => utc_naive(ts),
        }
    }

    fn is_dst(&self, ts: i64) -> bool {
        observes_dst(ts, self.local(ts).year(), Self::offset_at)
    }
}

/// DST detection from UTC offsets, for zones that only expose offsets.
///
/// A zone observes DST at `ts` when its offset is ahead of the smaller of the
/// January 1 and July 1 offsets of `year`.
fn observes_dst(ts: i64, year: i32, offset_at: impl Fn(i64) -> Option<i32>) -> bool {
    let first_of = |month: u32| -> Option<i64> {
        let naive = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
        Some(Utc.from_utc_datetime(&naive).timestamp())
    };
    let (Some(jan), Some(jul), Some(now)) = (
        first_of(1).and_then(&offset_at),
        first_of(7).and_then(&offset_at),
        offset_at(ts),
    ) else {
        return false;
    };
    jan != jul && now > jan.min(jul)
}

fn utc_naive(ts: i64) -> NaiveDateTime {
    Utc.timestamp_opt(ts, 0)
        .single()
        .unwrap_or_default()
        .naive_utc()
}

/// Scheduling state owned by a rotator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverState {
    /// Next time-trigger firing, unix seconds
    pub rollover_at: i64,
    /// Seconds between time triggers (0 when disabled)
    pub interval: i64,
    /// strftime template for archive names
    pub suffix: &'static str,
}

/// Computes rollover times for one destination
#[derive(Debug, Clone)]
pub struct RolloverScheduler {
    when: When,
    interval: i64,
    utc: bool,
    zone: Arc<dyn Zone>,
}

impl RolloverScheduler {
    pub fn new(when: When, interval_count: u32, utc: bool) -> Self {
        let zone: Arc<dyn Zone> = if utc {
            Arc::new(UtcZone)
        } else {
            Arc::new(LocalZone)
        };
        Self {
            when,
            interval: when.unit_secs() * i64::from(interval_count),
            utc,
            zone,
        }
    }

    pub fn from_config(config: &RotationConfig) -> Self {
        Self::new(config.when, config.interval, config.utc)
    }

    /// Replace the wall clock. Ignored for UTC schedules.
    pub fn with_zone(mut self, zone: Arc<dyn Zone>) -> Self {
        if !self.utc {
            self.zone = zone;
        }
        self
    }

    pub fn when(&self) -> When {
        self.when
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn is_utc(&self) -> bool {
        self.utc
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0
    }

    /// Wall-clock rendering of a timestamp in this schedule's zone
    pub fn local(&self, ts: i64) -> NaiveDateTime {
        self.zone.local(ts)
    }

    /// Initial state. `start` is the modification time of a pre-existing
    /// segment, or `now` for a fresh one.
    pub fn initial_state(&self, start: i64) -> RolloverState {
        RolloverState {
            rollover_at: self.compute_next(start),
            interval: self.interval,
            suffix: self.when.suffix(),
        }
    }

    /// Next rollover time, always strictly greater than `now`.
    ///
    /// With the time trigger disabled this is `i64::MAX`.
    pub fn compute_next(&self, now: i64) -> i64 {
        if !self.is_enabled() {
            return i64::MAX;
        }

        let mut next = self.aligned_base(now);
        if next <= now {
            next = self.skip_past(next, now);
        }

        if self.when.is_calendar_aligned() && !self.utc {
            let dst_now = self.zone.is_dst(now);
            let dst_next = self.zone.is_dst(next);
            if dst_now != dst_next {
                // One-hour heuristic: DST starting before the next rollover pulls
                // it an hour earlier, DST ending pushes it an hour later.
                next += if dst_now { DST_SHIFT_SECS } else { -DST_SHIFT_SECS };
                if next <= now {
                    next = self.skip_past(next, now);
                }
            }
        }
        next
    }

    /// Timestamp text naming the segment that started at `rollover_at - interval`
    pub fn archive_suffix(&self, rollover_at: i64, now: i64) -> String {
        let start = if self.is_enabled() && rollover_at != i64::MAX {
            rollover_at - self.interval
        } else {
            now
        };

        let mut stamp = start;
        if !self.utc {
            let dst_now = self.zone.is_dst(now);
            let dst_then = self.zone.is_dst(start);
            if dst_now != dst_then {
                stamp += if dst_now { DST_SHIFT_SECS } else { -DST_SHIFT_SECS };
            }
        }
        self.zone.local(stamp).format(self.when.suffix()).to_string()
    }

    fn aligned_base(&self, now: i64) -> i64 {
        match self.when {
            When::Midnight | When::Weekday(_) => {
                let local = self.zone.local(now);
                let since_midnight = i64::from(local.num_seconds_from_midnight());
                let midnight = now + (ONE_DAY_SECS - since_midnight);
                match self.when {
                    When::Weekday(target) => {
                        let day = local.weekday().num_days_from_monday() as i64;
                        let target = i64::from(target);
                        let days_to_wait = if day == target {
                            0
                        } else if day < target {
                            target - day
                        } else {
                            6 - day + target + 1
                        };
                        midnight + days_to_wait * ONE_DAY_SECS
                    }
                    _ => midnight,
                }
            }
            _ => now + self.interval,
        }
    }

    fn skip_past(&self, next: i64, now: i64) -> i64 {
        let behind = now - next;
        next + (behind / self.interval + 1) * self.interval
    }
}
