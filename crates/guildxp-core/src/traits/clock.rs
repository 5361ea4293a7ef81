// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock source used for ledger timestamps and same-day bucketing.

use chrono::{Local, NaiveDateTime};

/// Timestamp format written to every ledger worksheet.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Current time rendered with [`TIMESTAMP_FORMAT`].
    fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Current calendar day as `YYYY-MM-DD`.
    fn today(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }
}

/// The process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pinned(NaiveDateTime);

    impl Clock for Pinned {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    #[test]
    fn timestamp_and_day_share_a_prefix() {
        let at = chrono::NaiveDate::from_ymd_opt(2026, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 3))
            .unwrap();
        let clock = Pinned(at);
        assert_eq!(clock.timestamp(), "2026-03-09 07:05:03");
        assert_eq!(clock.today(), "2026-03-09");
        assert!(clock.timestamp().starts_with(&clock.today()));
    }
}
