use chrono::{Datelike, NaiveDate};
use rainpoint::{RainConfig, RainEngine, RainError, RainStatusKind};
use std::env;

/// Checks every business day of the current month up to today.
///
/// Run with `KMA_AUTH_KEY=... cargo run --example check_month`.
#[tokio::main]
async fn main() -> Result<(), RainError> {
    let auth_key = env::var("KMA_AUTH_KEY").unwrap_or_default();
    let config = RainConfig::load_or_default(None)?;
    let engine = RainEngine::from_config(&config)?;

    let now = engine.now();
    let today = now.date_naive();
    let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    let ctx = engine.context(auth_key, config.holidays_for_years([today.year()]));

    let batch = engine.check_period(first, today, &ctx).await?;

    println!("{} ~ {} at station {}", first, today, engine.station());
    for kind in RainStatusKind::ALL {
        println!("{:>14}: {:?}", kind.as_str(), batch.dates(kind));
    }
    for date in batch.dates(RainStatusKind::RainDetected) {
        if let Some(times) = batch.rain_times(*date) {
            println!("{} rained at {}", date, times.join(", "));
        }
    }

    Ok(())
}
