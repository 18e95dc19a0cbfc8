//! Defines the identity of a single station query: the calendar date, the
//! minute-precision window inside that date, and the station it targets.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Format used by the KMA API for window bounds (`1000`, `1559`, ...).
pub(crate) const HHMM_FORMAT: &str = "%H%M";

/// Parses a compact `HHMM` string (e.g. `"1030"`) into a `NaiveTime`.
///
/// Returns `None` for anything that is not exactly four digits forming a
/// valid time of day.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::parse_from_str(value, HHMM_FORMAT).ok()
}

/// Formats a time as compact `HHMM`, dropping seconds.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(HHMM_FORMAT).to_string()
}

/// Drops the seconds and sub-second part of a time.
pub(crate) fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    // Only a leap second can fail here, and it already sits in the right minute.
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// serde helper for config fields written as `"HHMM"`.
pub(crate) fn deserialize_hhmm<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_hhmm(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("expected HHMM time, got '{raw}'")))
}

/// The `(start, end)` pair of minutes to query for one date, both inclusive.
///
/// Produced by [`crate::resolve_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl QueryWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// A collapsed window, returned when it is too early to query today.
    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// One query against the station: date plus window plus station code.
///
/// This is also the key of the [`crate::ResultCache`]. It is immutable once
/// built; a different window for the same date is a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationWindow {
    pub date: NaiveDate,
    pub window: QueryWindow,
    pub station: String,
}

impl StationWindow {
    pub fn new(date: NaiveDate, window: QueryWindow, station: impl Into<String>) -> Self {
        Self {
            date,
            window,
            station: station.into(),
        }
    }

    /// `YYYYMMDDHHMM` of the window start, as the API's `tm1` parameter.
    pub fn tm1(&self) -> String {
        format!(
            "{}{}",
            self.date.format("%Y%m%d"),
            format_hhmm(self.window.start)
        )
    }

    /// `YYYYMMDDHHMM` of the window end, as the API's `tm2` parameter.
    pub fn tm2(&self) -> String {
        format!(
            "{}{}",
            self.date.format("%Y%m%d"),
            format_hhmm(self.window.end)
        )
    }
}

impl fmt::Display for StationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] stn {}", self.date, self.window, self.station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("1030"), NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(parse_hhmm("0000"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_hhmm("2460"), None);
        assert_eq!(parse_hhmm("103"), None);
        assert_eq!(parse_hhmm("10:3"), None);
        assert_eq!(parse_hhmm("-999"), None);
    }

    #[test]
    fn test_query_params() {
        let window = QueryWindow::new(
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(15, 59, 0).unwrap(),
        );
        let query = StationWindow::new(NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(), window, "400");
        assert_eq!(query.tm1(), "202407031000");
        assert_eq!(query.tm2(), "202407031559");
        assert_eq!(window.to_string(), "1000 ~ 1559");
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        let window = QueryWindow::new(start, end);
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(NaiveTime::from_hms_opt(16, 1, 0).unwrap()));
        assert!(!window.is_zero_width());
        assert!(QueryWindow::new(start, start).is_zero_width());
    }

    #[test]
    fn test_truncate_to_minute() {
        let t = NaiveTime::from_hms_milli_opt(11, 42, 37, 250).unwrap();
        assert_eq!(truncate_to_minute(t), NaiveTime::from_hms_opt(11, 42, 0).unwrap());
    }
}
