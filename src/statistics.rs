//! Historical rain-day statistics.
//!
//! Works on a rain-minute history (`rain_minutes_by_date` mapping ISO dates to
//! the minutes it rained) and summarises it as average rain days per calendar
//! month over the recent years.

use chrono::{Datelike, NaiveDate};
use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse rain history JSON")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid date '{0}' in rain history")]
    BadDate(String),

    #[error("Rain history contains no rain days")]
    Empty,

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}

/// Rain minutes recorded per date.
///
/// Only the length of each list matters here: a date counts as a rain day
/// when at least one minute was recorded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RainHistory {
    #[serde(default)]
    pub rain_minutes_by_date: BTreeMap<String, Vec<serde_json::Value>>,
}

impl RainHistory {
    /// Downloads and parses a history file.
    pub async fn fetch(url: &str) -> Result<Self, StatisticsError> {
        info!("Downloading rain history from {}", url);
        let response = reqwest::get(url)
            .await
            .map_err(|e| StatisticsError::NetworkRequest(url.to_string(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => StatisticsError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => StatisticsError::NetworkRequest(url.to_string(), e),
                });
            }
        };
        let body = response
            .text()
            .await
            .map_err(|e| StatisticsError::NetworkRequest(url.to_string(), e))?;
        Self::from_json(&body)
    }

    pub fn from_json(raw: &str) -> Result<Self, StatisticsError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Average rain days of one calendar month over a period of years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRainStats {
    pub period: String,
    pub month: u32,
    pub avg_rain_count: f64,
}

/// Counts rain days per `(year, month)`.
///
/// Returns a frame with columns `year` (i32), `month` (u32) and `rain_count`
/// (u32), ordered by year then month. Only months with at least one rain day
/// get a row; a month without rain is left out rather than counted as zero.
pub fn monthly_rain_days(history: &RainHistory) -> Result<DataFrame, StatisticsError> {
    let mut counts: BTreeMap<(i32, u32), u32> = BTreeMap::new();
    for (key, minutes) in &history.rain_minutes_by_date {
        let date = NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .map_err(|_| StatisticsError::BadDate(key.clone()))?;
        if !minutes.is_empty() {
            *counts.entry((date.year(), date.month())).or_insert(0) += 1;
        }
    }

    let mut years = Vec::with_capacity(counts.len());
    let mut months = Vec::with_capacity(counts.len());
    let mut rain_counts = Vec::with_capacity(counts.len());
    for ((year, month), count) in counts {
        years.push(year);
        months.push(month);
        rain_counts.push(count);
    }

    Ok(df!(
        "year" => years,
        "month" => months,
        "rain_count" => rain_counts,
    )?)
}

/// Mean `rain_count` per month over `years`, labelled with `label`.
///
/// Produces columns `period`, `month`, `avg_rain_count`, sorted by month.
/// Months absent from the selected years are absent from the result.
pub fn average_by_month(
    frame: &DataFrame,
    years: RangeInclusive<i32>,
    label: &str,
) -> Result<DataFrame, StatisticsError> {
    let averaged = frame
        .clone()
        .lazy()
        .filter(
            col("year")
                .gt_eq(lit(*years.start()))
                .and(col("year").lt_eq(lit(*years.end()))),
        )
        .group_by([col("month")])
        .agg([col("rain_count")
            .cast(DataType::Float64)
            .mean()
            .alias("avg_rain_count")])
        .with_column(lit(label.to_string()).alias("period"))
        .sort(["month"], SortMultipleOptions::default())
        .select([col("period"), col("month"), col("avg_rain_count")])
        .collect()?;
    Ok(averaged)
}

/// The standard reporting periods ending at `latest_year`: last 5, 3 and 1 years.
pub fn recent_periods(latest_year: i32) -> Vec<(String, RangeInclusive<i32>)> {
    [5, 3, 1]
        .into_iter()
        .map(|span| {
            let label = if span == 1 {
                "last 1 year".to_string()
            } else {
                format!("last {} years", span)
            };
            (label, latest_year - (span - 1)..=latest_year)
        })
        .collect()
}

/// Monthly averages for every period of [`recent_periods`], ending at the
/// latest year present in the history.
pub fn monthly_report(history: &RainHistory) -> Result<Vec<MonthlyRainStats>, StatisticsError> {
    let frame = monthly_rain_days(history)?;
    let latest_year = frame
        .column("year")?
        .i32()?
        .max()
        .ok_or(StatisticsError::Empty)?;

    let mut report = Vec::new();
    for (label, years) in recent_periods(latest_year) {
        let averaged = average_by_month(&frame, years, &label)?;
        let periods = averaged.column("period")?.str()?;
        let months = averaged.column("month")?.u32()?;
        let averages = averaged.column("avg_rain_count")?.f64()?;

        for ((period, month), avg) in periods.into_iter().zip(months).zip(averages) {
            if let (Some(period), Some(month), Some(avg)) = (period, month, avg) {
                report.push(MonthlyRainStats {
                    period: period.to_string(),
                    month,
                    avg_rain_count: avg,
                });
            }
        }
    }
    Ok(report)
}
