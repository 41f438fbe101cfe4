//! Clock abstraction for injectable time
//!
//! Scheduled jobs and ledger timestamps depend on "now". Hiding it behind a
//! trait lets tests drive overdue computations with a fixed point in time.

use chrono::{DateTime, Duration, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole days elapsed between two instants, truncated towards zero
///
/// A charge created 47 hours ago is 1 day old, not 2.
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

/// Duration of one scheduler day
pub fn one_day() -> Duration {
    Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_whole_days_truncate() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 3, 11, 0, 0).unwrap();
        assert_eq!(whole_days_between(from, to), 1);

        let to = Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap();
        assert_eq!(whole_days_between(from, to), 2);
    }

    #[test]
    fn test_system_clock_monotone_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
