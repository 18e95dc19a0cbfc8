//! Classification outcomes for a single date and for a batch of dates.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Rain status of one date.
///
/// `RainDetected` and `NoRain` require a successful fetch on a business day.
/// `Pass` means the date was not a business day, `Fail` that the status could
/// not be determined (fetch or parse failure).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "rain_times", rename_all = "snake_case")]
pub enum RainStatus {
    /// Minutes (`HH:MM`) with non-zero precipitation, in the order observed.
    RainDetected(Vec<String>),
    NoRain,
    Pass,
    Fail,
}

impl RainStatus {
    pub fn kind(&self) -> RainStatusKind {
        match self {
            RainStatus::RainDetected(_) => RainStatusKind::RainDetected,
            RainStatus::NoRain => RainStatusKind::NoRain,
            RainStatus::Pass => RainStatusKind::Pass,
            RainStatus::Fail => RainStatusKind::Fail,
        }
    }

    pub fn rain_times(&self) -> &[String] {
        match self {
            RainStatus::RainDetected(times) => times,
            _ => &[],
        }
    }
}

/// Payload-free discriminant of [`RainStatus`], used as a bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RainStatusKind {
    RainDetected,
    NoRain,
    Pass,
    Fail,
}

impl RainStatusKind {
    pub const ALL: [RainStatusKind; 4] = [
        RainStatusKind::RainDetected,
        RainStatusKind::NoRain,
        RainStatusKind::Pass,
        RainStatusKind::Fail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RainStatusKind::RainDetected => "rain_detected",
            RainStatusKind::NoRain => "no_rain",
            RainStatusKind::Pass => "pass",
            RainStatusKind::Fail => "fail",
        }
    }
}

impl fmt::Display for RainStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dates of a range query partitioned by [`RainStatusKind`].
///
/// Every date pushed appears in exactly one bucket. Within a bucket dates keep
/// the order in which they were pushed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    buckets: BTreeMap<RainStatusKind, Vec<NaiveDate>>,
    rain_times: BTreeMap<NaiveDate, Vec<String>>,
}

impl BatchResult {
    pub fn new() -> Self {
        let buckets = RainStatusKind::ALL
            .iter()
            .map(|kind| (*kind, Vec::new()))
            .collect();
        Self {
            buckets,
            rain_times: BTreeMap::new(),
        }
    }

    /// Records the status of `date`. Callers push each date once.
    pub fn push(&mut self, date: NaiveDate, status: RainStatus) {
        let kind = status.kind();
        if let RainStatus::RainDetected(times) = status {
            self.rain_times.insert(date, times);
        }
        self.buckets.entry(kind).or_default().push(date);
    }

    pub fn dates(&self, kind: RainStatusKind) -> &[NaiveDate] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: RainStatusKind) -> usize {
        self.dates(kind).len()
    }

    /// Total number of classified dates across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rain minutes for a date in the `RainDetected` bucket.
    pub fn rain_times(&self, date: NaiveDate) -> Option<&[String]> {
        self.rain_times.get(&date).map(Vec::as_slice)
    }

    /// Bucket kind of `date`, if it was part of the batch.
    pub fn kind_of(&self, date: NaiveDate) -> Option<RainStatusKind> {
        self.buckets
            .iter()
            .find(|(_, dates)| dates.contains(&date))
            .map(|(kind, _)| *kind)
    }
}
