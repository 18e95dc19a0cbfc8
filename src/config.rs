//! Runtime configuration, read once at startup.
//!
//! Every field has a default matching the Seoul (Gangnam) deployment, so an
//! empty or missing file is a valid configuration.
//!
//! ```toml
//! station = "400"
//! window_start = "1000"
//! window_end = "1600"
//! max_workers = 20
//! extra_holidays = ["2027-02-08"]
//! ```

use crate::calendar::business_day::HolidayCalendar;
use crate::error::RainError;
use crate::precipitation::client::{DEFAULT_BASE_URL, DEFAULT_FETCH_TIMEOUT, DEFAULT_VALIDATE_TIMEOUT};
use crate::types::station_window::{deserialize_hhmm, parse_hhmm};
use bon::Builder;
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = "rainpoint";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_STATISTICS_URL: &str =
    "https://raw.githubusercontent.com/117g/rain_streamlit/main/rainy_json_save_20200101-20250704.json";

fn default_window_start() -> NaiveTime {
    parse_hhmm("1000").unwrap_or_default()
}

fn default_window_end() -> NaiveTime {
    parse_hhmm("1600").unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
#[serde(default, deny_unknown_fields)]
pub struct RainConfig {
    /// AWS station code; every query targets this station.
    #[builder(into, default = "400".to_string())]
    pub station: String,

    /// First minute of the daily window (`HHMM` in the file).
    #[serde(deserialize_with = "deserialize_hhmm")]
    #[builder(default = default_window_start())]
    pub window_start: NaiveTime,

    /// Last minute of the daily window (`HHMM` in the file).
    #[serde(deserialize_with = "deserialize_hhmm")]
    #[builder(default = default_window_end())]
    pub window_end: NaiveTime,

    /// Upper bound on concurrent date checks in a range query.
    #[builder(default = 20)]
    pub max_workers: usize,

    /// Station local offset from UTC. KST by default.
    #[builder(default = 9 * 60)]
    pub utc_offset_minutes: i32,

    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    #[builder(default = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    #[builder(default = DEFAULT_VALIDATE_TIMEOUT.as_secs())]
    pub validate_timeout_secs: u64,

    /// Days off on top of the built-in Korean public holidays.
    #[builder(default)]
    pub extra_holidays: Vec<NaiveDate>,

    /// Rain-minute history used by the statistics report.
    #[builder(into, default = DEFAULT_STATISTICS_URL.to_string())]
    pub statistics_url: String,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RainConfig {
    /// `<config dir>/rainpoint/config.toml`, e.g. `~/.config/rainpoint/config.toml` on Linux.
    pub fn default_path() -> Result<PathBuf, RainError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(RainError::ConfigDirResolution)
    }

    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, RainError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RainError::ConfigRead(path.to_path_buf(), e))?;
        let config: RainConfig =
            toml::from_str(&raw).map_err(|e| RainError::ConfigParse(path.to_path_buf(), e))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given, else the default location if that file exists,
    /// else the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, RainError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Ok(default) if default.is_file() => Self::load(&default),
            _ => {
                info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), RainError> {
        let mut issues: Vec<String> = Vec::new();

        if self.station.trim().is_empty() {
            issues.push("station must not be empty".into());
        }
        if self.window_start >= self.window_end {
            issues.push("window_start must be before window_end".into());
        }
        if self.max_workers == 0 {
            issues.push("max_workers must be > 0".into());
        }
        if self.station_offset().is_err() {
            issues.push("utc_offset_minutes must be within +-24h".into());
        }
        if self.fetch_timeout_secs == 0 {
            issues.push("fetch_timeout_secs must be > 0".into());
        }
        if self.validate_timeout_secs == 0 {
            issues.push("validate_timeout_secs must be > 0".into());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(RainError::InvalidConfig(issues.join("; ")))
        }
    }

    pub fn station_offset(&self) -> Result<FixedOffset, RainError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                RainError::InvalidConfig(format!(
                    "utc_offset_minutes {} is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(self.validate_timeout_secs)
    }

    /// Korean public holidays of `years` plus the configured extra dates.
    pub fn holidays_for_years(&self, years: impl IntoIterator<Item = i32>) -> HolidayCalendar {
        let mut holidays = HolidayCalendar::korean(years);
        holidays.extend(self.extra_holidays.iter().copied());
        holidays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::business_day::is_business_day;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = RainConfig::default();
        assert_eq!(config.station, "400");
        assert_eq!(config.window_start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.window_end, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(config.max_workers, 20);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(20));
        assert_eq!(config.validate_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.station_offset().unwrap(),
            FixedOffset::east_opt(9 * 3600).unwrap()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
            station = "401"
            window_end = "1500"
            extra_holidays = ["2024-09-16", "2024-09-17"]
            "#,
        );
        let config = RainConfig::load(file.path()).unwrap();
        assert_eq!(config.station, "401");
        assert_eq!(config.window_end, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(config.max_workers, 20);
        let holidays = config.holidays_for_years([2024]);
        assert!(holidays.contains(NaiveDate::from_ymd_opt(2024, 9, 17).unwrap()));
        assert!(holidays.contains(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
    }

    #[test]
    fn test_load_empty_file_is_default() {
        let file = write_config("");
        assert_eq!(RainConfig::load(file.path()).unwrap(), RainConfig::default());
    }

    #[test]
    fn test_bad_hhmm_is_parse_error() {
        let file = write_config(r#"window_start = "10:00""#);
        assert!(matches!(
            RainConfig::load(file.path()),
            Err(RainError::ConfigParse(_, _))
        ));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let file = write_config("max_threads = 4");
        assert!(matches!(
            RainConfig::load(file.path()),
            Err(RainError::ConfigParse(_, _))
        ));
    }

    #[test]
    fn test_validation_collects_issues() {
        let config = RainConfig::builder()
            .station("")
            .window_start(NaiveTime::from_hms_opt(16, 0, 0).unwrap())
            .window_end(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
            .max_workers(0)
            .build();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("station"));
        assert!(err.contains("window_start"));
        assert!(err.contains("max_workers"));
    }

    #[test]
    fn test_default_holidays_include_chuseok_and_substitutes() {
        let holidays = RainConfig::default().holidays_for_years([2024]);
        for date in [
            NaiveDate::from_ymd_opt(2024, 9, 17).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
        ] {
            assert!(!is_business_day(date, &holidays), "{} is a holiday", date);
        }
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            RainConfig::load(&missing),
            Err(RainError::ConfigRead(_, _))
        ));
    }
}
