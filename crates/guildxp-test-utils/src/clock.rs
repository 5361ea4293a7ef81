// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A clock tests can pin and move.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, NaiveDateTime};
use guildxp_core::{Clock, TIMESTAMP_FORMAT};

/// Clock frozen at a settable instant (second precision).
#[derive(Debug)]
pub struct FixedClock {
    secs: AtomicI64,
}

impl FixedClock {
    /// Pin the clock at a `YYYY-MM-DD HH:MM:SS` timestamp.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` does not parse.
    pub fn at(timestamp: &str) -> Self {
        let at = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .unwrap_or_else(|e| panic!("bad FixedClock timestamp {timestamp:?}: {e}"));
        Self {
            secs: AtomicI64::new(at.and_utc().timestamp()),
        }
    }

    /// Jump to another timestamp.
    pub fn set(&self, timestamp: &str) {
        let other = Self::at(timestamp);
        self.secs
            .store(other.secs.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.secs.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at("2026-03-09 10:00:00")
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        DateTime::from_timestamp(self.secs.load(Ordering::SeqCst), 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }
}
