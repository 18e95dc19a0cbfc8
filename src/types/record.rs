//! Minute-resolution observations and the result of fetching them.

use crate::precipitation::error::FetchFailure;
use chrono::NaiveTime;

/// One minute of station data, reduced to the fields rain detection needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipitationRecord {
    /// Minute of the observation (local station time).
    pub observed_at: NaiveTime,
    /// Precipitation in mm. Never negative; missing values are stored as 0.
    pub amount_mm: f64,
}

impl PrecipitationRecord {
    pub fn new(observed_at: NaiveTime, amount_mm: f64) -> Self {
        Self {
            observed_at,
            amount_mm,
        }
    }

    pub fn is_wet(&self) -> bool {
        self.amount_mm != 0.0
    }
}

/// Result of a single remote fetch. Either every record of the payload, or
/// the reason nothing usable came back.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Vec<PrecipitationRecord>),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn records(&self) -> Option<&[PrecipitationRecord]> {
        match self {
            FetchOutcome::Success(records) => Some(records),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(reason) => Some(reason),
        }
    }
}

impl From<FetchFailure> for FetchOutcome {
    fn from(reason: FetchFailure) -> Self {
        FetchOutcome::Failure(reason)
    }
}
