//! Time source abstraction.
//!
//! The engine stamps `accepted_at`/`completed_at` with epoch milliseconds and
//! buckets daily statistics by the local calendar date.

use chrono::{Local, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Local calendar date of [`Clock::now_ms`] formatted as `YYYY-MM-DD`.
    fn local_date(&self) -> String {
        local_date_of(self.now_ms())
    }
}

/// Formats epoch milliseconds as a local `YYYY-MM-DD` date.
pub fn local_date_of(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => Local::now().format("%Y-%m-%d").to_string(),
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_local_date_shape() {
        let date = ManualClock::new(1_735_732_800_000).local_date();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }

    #[test]
    fn test_days_apart_have_different_dates() {
        let day_ms = 24 * 60 * 60 * 1000;
        let clock = ManualClock::new(1_735_732_800_000);
        let first = clock.local_date();
        clock.advance(day_ms);
        assert_ne!(first, clock.local_date());
    }
}
