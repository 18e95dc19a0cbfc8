//! HTTP client for the KMA AWS minute-data endpoint.

use crate::config::RainConfig;
use crate::error::RainError;
use crate::precipitation::error::FetchFailure;
use crate::precipitation::parser::{parse_payload, PRECIPITATION_COLUMN};
use crate::types::record::FetchOutcome;
use crate::types::station_window::StationWindow;
use bon::bon;
use log::{info, warn};
use reqwest::{Client, StatusCode, Url};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://apihub.kma.go.kr/api/typ01/cgi-bin/url/nph-aws2_min";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce minute records for a [`StationWindow`].
///
/// Implementations must turn every problem into [`FetchOutcome::Failure`];
/// the engine relies on `fetch` never panicking or erroring out.
pub trait PrecipitationSource: Send + Sync + 'static {
    fn fetch(
        &self,
        query: &StationWindow,
        auth_key: &str,
    ) -> impl Future<Output = FetchOutcome> + Send;
}

impl<T: PrecipitationSource> PrecipitationSource for Arc<T> {
    fn fetch(
        &self,
        query: &StationWindow,
        auth_key: &str,
    ) -> impl Future<Output = FetchOutcome> + Send {
        self.as_ref().fetch(query, auth_key)
    }
}

/// Fetches and parses minute data over HTTP.
///
/// Each request carries its own timeout: [`DEFAULT_FETCH_TIMEOUT`] for data
/// and [`DEFAULT_VALIDATE_TIMEOUT`] for credential checks unless configured.
///
/// # Examples
///
/// ```no_run
/// # use rainpoint::{PrecipitationClient, RainError};
/// # use std::time::Duration;
/// # fn run() -> Result<(), RainError> {
/// let client = PrecipitationClient::builder()
///     .fetch_timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PrecipitationClient {
    http: Client,
    base_url: String,
    fetch_timeout: Duration,
    validate_timeout: Duration,
}

#[bon]
impl PrecipitationClient {
    #[builder]
    pub fn new(
        #[builder(into)] base_url: Option<String>,
        fetch_timeout: Option<Duration>,
        validate_timeout: Option<Duration>,
    ) -> Result<Self, RainError> {
        let http = Client::builder().build().map_err(RainError::HttpClient)?;
        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fetch_timeout: fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT),
            validate_timeout: validate_timeout.unwrap_or(DEFAULT_VALIDATE_TIMEOUT),
        })
    }

    pub fn from_config(config: &RainConfig) -> Result<Self, RainError> {
        Self::builder()
            .base_url(config.base_url.clone())
            .fetch_timeout(config.fetch_timeout())
            .validate_timeout(config.validate_timeout())
            .build()
    }

    /// Full request URL for a query. The key is sent as the `authKey` parameter.
    pub fn request_url(&self, query: &StationWindow, auth_key: &str) -> Result<Url, FetchFailure> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("tm1", query.tm1()),
                ("tm2", query.tm2()),
                ("stn", query.station.clone()),
                ("disp", "0".to_string()),
                ("help", "0".to_string()),
                ("authKey", auth_key.to_string()),
            ],
        )
        .map_err(|e| FetchFailure::Transport(format!("invalid URL '{}': {e}", self.base_url)))
    }

    /// Checks a credential by issuing `check_query` (normally a zero-width window on
    /// today). Valid iff the API answers 200 with the precipitation column in
    /// the body. Errors are logged and count as invalid.
    pub async fn validate_credential(&self, check_query: &StationWindow, auth_key: &str) -> bool {
        let url = match self.request_url(check_query, auth_key) {
            Ok(url) => url,
            Err(e) => {
                warn!("Credential check could not build request: {}", e);
                return false;
            }
        };

        let response = match self
            .http
            .get(url)
            .timeout(self.validate_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Credential check failed: {}",
                    FetchFailure::from_reqwest(e, self.validate_timeout)
                );
                return false;
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Credential check rejected with status {}", response.status());
            return false;
        }

        match response.text().await {
            Ok(body) => body.contains(PRECIPITATION_COLUMN),
            Err(e) => {
                warn!("Credential check could not read body: {}", e);
                false
            }
        }
    }

    async fn get_text(&self, query: &StationWindow, auth_key: &str) -> Result<String, FetchFailure> {
        let url = self.request_url(query, auth_key)?;
        let timeout = self.fetch_timeout;

        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchFailure::from_reqwest(e, timeout))?;

        let response = response
            .error_for_status()
            .map_err(|e| FetchFailure::from_reqwest(e, timeout))?;

        response
            .text()
            .await
            .map_err(|e| FetchFailure::from_reqwest(e, timeout))
    }
}

impl PrecipitationSource for PrecipitationClient {
    async fn fetch(&self, query: &StationWindow, auth_key: &str) -> FetchOutcome {
        info!("Fetching minute data for {}", query);

        let outcome: FetchOutcome = match self.get_text(query, auth_key).await {
            Ok(body) => match parse_payload(&body) {
                Ok(records) => FetchOutcome::Success(records),
                Err(e) => FetchFailure::from(e).into(),
            },
            Err(failure) => failure.into(),
        };

        match &outcome {
            FetchOutcome::Success(records) => {
                info!("Received {} minute records for {}", records.len(), query)
            }
            FetchOutcome::Failure(reason) => warn!("Fetch failed for {}: {}", query, reason),
        }
        outcome
    }
}
