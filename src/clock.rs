//! Time sources. The engine and the cache never read the system clock
//! directly, so tests can pin "now".

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `now()` in the given station offset.
    fn now_in(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.now().with_timezone(&offset)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 7, 3, 1, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(TimeDelta::minutes(90));
        assert_eq!(clock.now(), start + TimeDelta::minutes(90));
    }

    #[test]
    fn test_now_in_station_offset() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 3, 23, 30, 0).unwrap());
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let local = clock.now_in(kst);
        assert_eq!(local.date_naive().to_string(), "2024-07-04");
        assert_eq!(local.format("%H%M").to_string(), "0830");
    }
}
