//! The rain-detection pipeline.
//!
//! For each date: resolve the query window, check the business-day rule, look
//! in the cache or fetch, then classify. [`RainEngine::check_range`] runs that
//! pipeline for many dates on a bounded set of tokio tasks and gathers the
//! statuses into a [`BatchResult`].

use crate::cache::ResultCache;
use crate::calendar::business_day::{eligible_dates, is_business_day, HolidayCalendar};
use crate::calendar::time_window::resolve_window;
use crate::classifier::classify;
use crate::clock::{Clock, SystemClock};
use crate::config::RainConfig;
use crate::error::RainError;
use crate::precipitation::client::{PrecipitationClient, PrecipitationSource};
use crate::types::rain_status::{BatchResult, RainStatus};
use crate::types::record::FetchOutcome;
use crate::types::station_window::{QueryWindow, StationWindow};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use futures_util::future::join_all;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Request-scoped inputs: the resolved "now" in station time, the API
/// credential, and the holidays in force. Read-only for the whole request.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub now: DateTime<FixedOffset>,
    pub auth_key: String,
    pub holidays: Arc<HolidayCalendar>,
}

impl QueryContext {
    pub fn new(
        now: DateTime<FixedOffset>,
        auth_key: impl Into<String>,
        holidays: HolidayCalendar,
    ) -> Self {
        Self {
            now,
            auth_key: auth_key.into(),
            holidays: Arc::new(holidays),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Outcome of a single-date check, with the details a caller may want to show.
#[derive(Debug, Clone, PartialEq)]
pub struct RainReport {
    pub date: NaiveDate,
    pub window: QueryWindow,
    pub eligible: bool,
    pub status: RainStatus,
    /// The records came from the cache rather than the network.
    pub from_cache: bool,
}

/// Rain-detection engine for one station.
///
/// Cheap to clone: the source, cache and clock are shared.
///
/// # Examples
///
/// ```no_run
/// # use rainpoint::{RainConfig, RainEngine, RainError};
/// # use chrono::Datelike;
/// # #[tokio::main]
/// # async fn main() -> Result<(), RainError> {
/// let config = RainConfig::default();
/// let engine = RainEngine::from_config(&config)?;
/// let now = engine.now();
/// let holidays = config.holidays_for_years([now.year()]);
/// let ctx = engine.context("my-auth-key", holidays);
///
/// let report = engine.check_date(ctx.today(), &ctx).await;
/// println!("{}: {:?}", report.date, report.status);
/// # Ok(())
/// # }
/// ```
pub struct RainEngine<S = PrecipitationClient> {
    source: Arc<S>,
    cache: Arc<ResultCache>,
    clock: Arc<dyn Clock>,
    station: String,
    window_start: NaiveTime,
    window_end: NaiveTime,
    max_workers: usize,
    offset: FixedOffset,
}

impl<S> Clone for RainEngine<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            station: self.station.clone(),
            window_start: self.window_start,
            window_end: self.window_end,
            max_workers: self.max_workers,
            offset: self.offset,
        }
    }
}

impl RainEngine<PrecipitationClient> {
    /// Engine backed by the HTTP client and the system clock.
    pub fn from_config(config: &RainConfig) -> Result<Self, RainError> {
        let client = PrecipitationClient::from_config(config)?;
        Self::with_source(client, config, Arc::new(SystemClock))
    }

    /// Checks a credential with a zero-width query on today.
    pub async fn validate_credential(&self, auth_key: &str) -> bool {
        let today = self.now().date_naive();
        let check_query = StationWindow::new(
            today,
            QueryWindow::new(self.window_start, self.window_start),
            self.station.clone(),
        );
        let valid = self.source.validate_credential(&check_query, auth_key).await;
        info!("Credential check: {}", if valid { "valid" } else { "rejected" });
        valid
    }
}

impl<S: PrecipitationSource> RainEngine<S> {
    pub fn with_source(source: S, config: &RainConfig, clock: Arc<dyn Clock>) -> Result<Self, RainError> {
        config.validate()?;
        let offset = config.station_offset()?;
        Ok(Self {
            source: Arc::new(source),
            cache: Arc::new(ResultCache::new(Arc::clone(&clock))),
            clock,
            station: config.station.clone(),
            window_start: config.window_start,
            window_end: config.window_end,
            max_workers: config.max_workers,
            offset,
        })
    }

    /// Current time in the station's local offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now_in(self.offset)
    }

    /// A [`QueryContext`] pinned to the engine clock's current time.
    pub fn context(&self, auth_key: impl Into<String>, holidays: HolidayCalendar) -> QueryContext {
        QueryContext::new(self.now(), auth_key, holidays)
    }

    pub fn resolve_window(&self, date: NaiveDate, now: DateTime<FixedOffset>) -> QueryWindow {
        resolve_window(date, now, self.window_start, self.window_end)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    /// Runs the full pipeline for one date.
    ///
    /// Non-business days are answered with `Pass` without touching the
    /// network. Recent past dates go through the cache; today and older
    /// dates always fetch.
    pub async fn check_date(&self, date: NaiveDate, ctx: &QueryContext) -> RainReport {
        let window = self.resolve_window(date, ctx.now);
        let eligible = is_business_day(date, &ctx.holidays);

        if !eligible {
            debug!("{} is not a business day", date);
            return RainReport {
                date,
                window,
                eligible,
                status: RainStatus::Pass,
                from_cache: false,
            };
        }

        let query = StationWindow::new(date, window, self.station.clone());
        let (outcome, from_cache) = self.lookup(query, ctx).await;
        let status = classify(eligible, &outcome, &window);

        RainReport {
            date,
            window,
            eligible,
            status,
            from_cache,
        }
    }

    async fn lookup(&self, query: StationWindow, ctx: &QueryContext) -> (FetchOutcome, bool) {
        if !ResultCache::is_cache_eligible(query.date, ctx.today()) {
            return (self.source.fetch(&query, &ctx.auth_key).await, false);
        }

        if let Some(hit) = self.cache.get(&query) {
            return (hit, true);
        }

        let outcome = self.source.fetch(&query, &ctx.auth_key).await;
        if self.cache.put(query.clone(), &outcome) {
            debug!("Cached result for {}", query);
        }
        (outcome, false)
    }

    /// Checks every date concurrently, at most `max_workers` at a time, and
    /// partitions the results. Returns once every date is done.
    ///
    /// A date whose task fails is recorded as `Fail`; the rest of the batch is
    /// unaffected. Repeated dates are checked once. Within each bucket dates
    /// keep input order.
    pub async fn check_range(&self, dates: &[NaiveDate], ctx: &QueryContext) -> BatchResult {
        let mut seen = HashSet::new();
        let dates: Vec<NaiveDate> = dates.iter().copied().filter(|d| seen.insert(*d)).collect();

        info!(
            "Checking {} dates with up to {} workers",
            dates.len(),
            self.max_workers
        );

        let permits = Arc::new(Semaphore::new(self.max_workers));
        let ctx = Arc::new(ctx.clone());

        let handles: Vec<_> = dates
            .iter()
            .map(|&date| {
                let engine = self.clone();
                let ctx = Arc::clone(&ctx);
                let permits = Arc::clone(&permits);
                tokio::spawn(async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return RainStatus::Fail,
                    };
                    engine.check_date(date, &ctx).await.status
                })
            })
            .collect();

        let mut batch = BatchResult::new();
        for (date, joined) in dates.iter().zip(join_all(handles).await) {
            let status = joined.unwrap_or_else(|e| {
                warn!("Check for {} did not complete: {}", date, e);
                RainStatus::Fail
            });
            batch.push(*date, status);
        }
        batch
    }

    /// Checks the business days of `[start, end]`.
    ///
    /// `end` may not be after today; today is only included once the daily
    /// window has opened.
    pub async fn check_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        ctx: &QueryContext,
    ) -> Result<BatchResult, RainError> {
        if start > end {
            return Err(RainError::InvalidRange { start, end });
        }
        let today = ctx.today();
        if end > today {
            return Err(RainError::RangeInFuture { end, today });
        }

        let dates = eligible_dates(start, end, &ctx.holidays, ctx.now, self.window_start);
        if dates.is_empty() {
            return Ok(BatchResult::new());
        }
        Ok(self.check_range(&dates, ctx).await)
    }
}
