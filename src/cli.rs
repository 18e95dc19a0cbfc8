//! Command-line front end.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use rainpoint::{
    format_hhmm, monthly_report, BatchResult, MonthlyRainStats, RainConfig, RainEngine,
    RainHistory, RainReport, RainStatus, RainStatusKind,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rainpoint")]
#[command(about = "Check for rain at a KMA weather station during business hours")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Config file (defaults to <config dir>/rainpoint/config.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// KMA API hub key
    #[arg(long, global = true, env = "KMA_AUTH_KEY", hide_env_values = true)]
    pub auth_key: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check today so far
    Today,
    /// Check a single date (YYYY-MM-DD)
    Date { date: NaiveDate },
    /// Check every business day from START to END inclusive
    Range { start: NaiveDate, end: NaiveDate },
    /// Check that the API key is accepted
    Validate,
    /// Average rain days per month over the last 5, 3 and 1 years
    Stats {
        /// History JSON to use instead of the configured one
        #[arg(long)]
        url: Option<String>,
    },
}

pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rainpoint={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

pub async fn run(args: Args) -> Result<()> {
    let config = RainConfig::load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Stats { url } => {
            let url = url.unwrap_or_else(|| config.statistics_url.clone());
            stats(&url, args.json).await
        }
        command => {
            let auth_key = args
                .auth_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .context("No API key: pass --auth-key or set KMA_AUTH_KEY")?;
            let engine =
                RainEngine::from_config(&config).context("Failed to set up the engine")?;
            check(command, &engine, &config, auth_key, args.json).await
        }
    }
}

async fn check(
    command: Command,
    engine: &RainEngine,
    config: &RainConfig,
    auth_key: &str,
    as_json: bool,
) -> Result<()> {
    match command {
        Command::Validate => {
            if engine.validate_credential(auth_key).await {
                println!("API key accepted");
                Ok(())
            } else {
                bail!("API key rejected")
            }
        }
        Command::Today => {
            let now = engine.now();
            let ctx = engine.context(auth_key, config.holidays_for_years([now.year()]));
            let window = engine.resolve_window(ctx.today(), ctx.now);
            if window.is_zero_width() {
                println!(
                    "Too early: checks for {} start at {}",
                    ctx.today(),
                    format_hhmm(config.window_start)
                );
                return Ok(());
            }
            let report = engine.check_date(ctx.today(), &ctx).await;
            print_report(&report, as_json)
        }
        Command::Date { date } => {
            let ctx = engine.context(auth_key, config.holidays_for_years([date.year()]));
            if date > ctx.today() {
                bail!("{} is in the future", date);
            }
            let report = engine.check_date(date, &ctx).await;
            print_report(&report, as_json)
        }
        Command::Range { start, end } => {
            let holidays = config.holidays_for_years(start.year()..=end.year());
            let ctx = engine.context(auth_key, holidays);
            let batch = engine.check_period(start, end, &ctx).await?;
            print_batch(&batch, as_json)
        }
        Command::Stats { .. } => bail!("stats does not query the station"),
    }
}

fn print_report(report: &RainReport, as_json: bool) -> Result<()> {
    if as_json {
        let value = json!({
            "date": report.date,
            "window": report.window.to_string(),
            "eligible": report.eligible,
            "from_cache": report.from_cache,
            "result": report.status,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} ({})", report.date, report.window);
    match &report.status {
        RainStatus::RainDetected(times) => {
            println!("Rain detected at {} minute(s): {}", times.len(), times.join(", "))
        }
        RainStatus::NoRain => println!("No rain"),
        RainStatus::Pass => println!("Not a business day"),
        RainStatus::Fail => println!("Could not determine rain status"),
    }
    Ok(())
}

fn print_batch(batch: &BatchResult, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(batch)?);
        return Ok(());
    }

    if batch.is_empty() {
        println!("No business days to check");
        return Ok(());
    }

    for kind in RainStatusKind::ALL {
        let dates = batch.dates(kind);
        println!("{}: {}", label(kind), dates.len());
        for date in dates {
            match batch.rain_times(*date) {
                Some(times) => println!("  {} {}", date, times.join(", ")),
                None => println!("  {}", date),
            }
        }
    }
    Ok(())
}

fn label(kind: RainStatusKind) -> &'static str {
    match kind {
        RainStatusKind::RainDetected => "Rain detected",
        RainStatusKind::NoRain => "No rain",
        RainStatusKind::Pass => "Not a business day",
        RainStatusKind::Fail => "Failed",
    }
}

async fn stats(url: &str, as_json: bool) -> Result<()> {
    let history = RainHistory::fetch(url).await?;
    let report = monthly_report(&history)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut current: Option<&str> = None;
    for MonthlyRainStats {
        period,
        month,
        avg_rain_count,
    } in &report
    {
        if current != Some(period.as_str()) {
            println!("{}", period);
            current = Some(period.as_str());
        }
        println!("  {:>2}: {:.1} rain days", month, avg_rain_count);
    }
    Ok(())
}
