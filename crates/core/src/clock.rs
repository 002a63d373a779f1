// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::sync::Arc;

/// Format used for the wall-clock write time column of lineage logs.
pub const WRITE_TIME_FORMAT: &str = "%Y%m%d %H%M%S";

/// A clock that provides the current local wall-clock time
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<NaiveDateTime>>,
}

impl FakeClock {
    /// Create a clock frozen at 2024-01-01 12:00:00.
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self::at(start)
    }

    /// Create a clock frozen at the given time
    pub fn at(time: NaiveDateTime) -> Self {
        Self { current: Arc::new(Mutex::new(time)) }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock();
        *current += duration;
    }

    /// Set the clock to a specific time
    pub fn set(&self, time: NaiveDateTime) {
        *self.current.lock() = time;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock()
    }
}

/// Render a write time the way lineage log lines store it.
pub fn format_write_time(time: &NaiveDateTime) -> String {
    time.format(WRITE_TIME_FORMAT).to_string()
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
