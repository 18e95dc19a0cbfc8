use crate::statistics::StatisticsError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from setting up the engine or validating a request.
///
/// Fetch and classification problems are not errors: they surface as
/// [`crate::FetchOutcome::Failure`] and [`crate::RainStatus::Fail`].
#[derive(Debug, Error)]
pub enum RainError {
    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to determine config directory")]
    ConfigDirResolution,

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("End date {end} is after today ({today})")]
    RangeInFuture { end: NaiveDate, today: NaiveDate },

    #[error(transparent)]
    Statistics(#[from] StatisticsError),
}
