//! Wall-clock source.

use chrono::{DateTime, FixedOffset, Local, NaiveTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::schedule::next_fire_time;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    /// The next instant at which this clock's local time reads `at`.
    fn next_occurrence(&self, at: NaiveTime) -> DateTime<Utc> {
        next_fire_time(&self.now(), at).with_timezone(&Utc)
    }
}

/// The system's local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn next_occurrence(&self, at: NaiveTime) -> DateTime<Utc> {
        next_fire_time(&Local::now(), at).with_timezone(&Utc)
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start = DateTime::parse_from_rfc3339("2026-05-01T10:00:00-03:00").unwrap();
        let clock = ManualClock::new(start);
        clock.advance(TimeDelta::minutes(2));
        assert_eq!(clock.now(), start + TimeDelta::minutes(2));
        assert_eq!(clock.now_utc().to_rfc3339(), "2026-05-01T13:02:00+00:00");
    }

    #[test]
    fn test_manual_clock_next_occurrence() {
        let start = DateTime::parse_from_rfc3339("2026-05-01T10:00:00-03:00").unwrap();
        let clock = ManualClock::new(start);
        let at = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(clock.next_occurrence(at).to_rfc3339(), "2026-05-02T12:30:00+00:00");
    }
}
