mod cache;
mod calendar;
mod classifier;
mod clock;
mod config;
mod engine;
mod error;
mod precipitation;
mod statistics;
mod types;

pub use error::RainError;

pub use config::{RainConfig, DEFAULT_STATISTICS_URL};
pub use engine::{QueryContext, RainEngine, RainReport};

pub use cache::{ResultCache, CACHE_HORIZON_DAYS, CACHE_TTL};
pub use classifier::classify;
pub use clock::{Clock, ManualClock, SystemClock};

pub use calendar::business_day::{
    dates_in_range, eligible_dates, is_business_day, HolidayCalendar, KOREAN_FIXED_HOLIDAYS,
    KOREAN_MOVABLE_HOLIDAYS, KOREAN_MOVABLE_YEARS,
};
pub use calendar::time_window::resolve_window;

pub use precipitation::client::{
    PrecipitationClient, PrecipitationSource, DEFAULT_BASE_URL, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_VALIDATE_TIMEOUT,
};
pub use precipitation::error::{FailureKind, FetchFailure, PayloadError};
pub use precipitation::parser::{parse_payload, COLUMN_NAMES, PRECIPITATION_COLUMN};

pub use types::rain_status::{BatchResult, RainStatus, RainStatusKind};
pub use types::record::{FetchOutcome, PrecipitationRecord};
pub use types::station_window::{format_hhmm, parse_hhmm, QueryWindow, StationWindow};

pub use statistics::{
    average_by_month, monthly_rain_days, monthly_report, recent_periods, MonthlyRainStats,
    RainHistory, StatisticsError,
};
