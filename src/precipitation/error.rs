use std::time::Duration;
use thiserror::Error;

/// Why a fetch produced no records. Carried as a value inside
/// [`crate::FetchOutcome::Failure`], never returned as an `Err`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchFailure {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network request failed: {0}")]
    Transport(String),

    // Non-2xx response; belongs to the transport class.
    #[error("HTTP request failed with status {0}")]
    HttpStatus(u16),

    #[error("Unexpected payload: {0}")]
    Parse(#[from] PayloadError),
}

/// Coarse failure class, as reported to callers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    Transport,
    Parse,
}

impl FetchFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchFailure::Timeout(_) => FailureKind::Timeout,
            FetchFailure::Transport(_) | FetchFailure::HttpStatus(_) => FailureKind::Transport,
            FetchFailure::Parse(_) => FailureKind::Parse,
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            FetchFailure::Timeout(timeout)
        } else if let Some(status) = error.status() {
            FetchFailure::HttpStatus(status.as_u16())
        } else {
            FetchFailure::Transport(error.to_string())
        }
    }
}

/// The response body did not match the minute-data table layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("line {line}: expected at least {expected} fields, found {found}")]
    TruncatedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid timestamp '{value}'")]
    BadTimestamp { line: usize, value: String },
}
