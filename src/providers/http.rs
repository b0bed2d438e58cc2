//! HTTP provider for the OpenF1 REST API

use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, trace};
use url::Url;

use crate::provider::{Endpoint, Provider};
use crate::types::{Driver, Meeting, MeetingKey, Session, SessionKey, SessionResult};
use crate::{PaddockError, PipelineConfig, Result};

/// Provider that issues one HTTPS GET per query
#[derive(Debug)]
pub struct HttpProvider {
    /// Shared connection pool
    client: reqwest::Client,

    /// API root, always ending in `/`
    base_url: Url,

    /// Requests sent since construction
    requests: AtomicU64,
}

impl HttpProvider {
    /// Create a provider from the HTTP settings of `config`
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            PaddockError::config(format!("invalid base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PaddockError::config(format!(
                "base_url '{}' cannot be used as a base",
                config.base_url
            )));
        }
        // Relative joins replace the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PaddockError::transport("client setup", e))?;

        info!(base_url = %base_url, "HTTP provider ready");

        Ok(Self { client, base_url, requests: AtomicU64::new(0) })
    }

    /// API root requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Number of requests sent so far
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Absolute URL for `endpoint`
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url> {
        let mut url = self
            .base_url
            .join(endpoint.path())
            .map_err(|e| PaddockError::config(format!("cannot resolve {endpoint}: {e}")))?;

        let query = endpoint.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<Vec<T>> {
        let url = self.url_for(&endpoint)?;
        let sequence = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(%endpoint, sequence, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PaddockError::transport(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaddockError::status(endpoint, status, body));
        }

        let bytes = response.bytes().await.map_err(|e| PaddockError::transport(endpoint, e))?;
        let records: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| PaddockError::decode(endpoint, e))?;

        trace!(%endpoint, bytes = bytes.len(), records = records.len(), "Response decoded");
        Ok(records)
    }
}

#[async_trait::async_trait]
impl Provider for HttpProvider {
    async fn meetings(&self, year: Option<u32>) -> Result<Vec<Meeting>> {
        self.fetch(Endpoint::Meetings { year }).await
    }

    async fn sessions_for_meeting(&self, meeting: MeetingKey) -> Result<Vec<Session>> {
        self.fetch(Endpoint::SessionsForMeeting(meeting)).await
    }

    async fn session(&self, session: SessionKey) -> Result<Vec<Session>> {
        self.fetch(Endpoint::Session(session)).await
    }

    async fn drivers_for_session(&self, session: SessionKey) -> Result<Vec<Driver>> {
        self.fetch(Endpoint::DriversForSession(session)).await
    }

    async fn latest_drivers(&self) -> Result<Vec<Driver>> {
        self.fetch(Endpoint::LatestDrivers).await
    }

    async fn session_results(&self, session: SessionKey) -> Result<Vec<SessionResult>> {
        self.fetch(Endpoint::SessionResults(session)).await
    }
}
