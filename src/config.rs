//! Pipeline configuration
//!
//! Every field has a default tuned for the public OpenF1 service, so an empty
//! YAML document (or [`PipelineConfig::default`]) is a working configuration.
//!
//! ```rust
//! use paddock::PipelineConfig;
//!
//! let config = PipelineConfig::from_yaml_str("fetch_delay_ms: 500\nmax_in_flight: 1\n").unwrap();
//! assert_eq!(config.fetch_delay_ms, 500);
//! assert_eq!(config.base_url, "https://api.openf1.org/v1/");
//! ```

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::stream::Pacing;
use crate::{PaddockError, Result};

/// Public OpenF1 endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1/";

/// Settings for the HTTP provider and request pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root URL the endpoint paths are resolved against
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// `User-Agent` header sent with each request
    pub user_agent: String,
    /// Delay before the per-year meeting request
    pub warmup_delay_ms: u64,
    /// Delay before each per-meeting session lookup
    pub lookup_delay_ms: u64,
    /// Delay before each per-session detail, result or driver request
    pub fetch_delay_ms: u64,
    /// Maximum requests of one fan-out allowed in flight at once
    pub max_in_flight: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: concat!("paddock/", env!("CARGO_PKG_VERSION")).to_string(),
            warmup_delay_ms: 500,
            lookup_delay_ms: 1000,
            fetch_delay_ms: 300,
            max_in_flight: 1,
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document, filling unspecified fields with defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| PaddockError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(PaddockError::config("max_in_flight must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(PaddockError::config("timeout_secs must be at least 1"));
        }
        if self.base_url.trim().is_empty() {
            return Err(PaddockError::config("base_url must not be empty"));
        }
        Ok(())
    }

    /// Config with every pacing delay set to zero.
    ///
    /// Meant for offline snapshots and tests; never point this at the public
    /// service.
    pub fn unpaced() -> Self {
        Self { warmup_delay_ms: 0, lookup_delay_ms: 0, fetch_delay_ms: 0, ..Self::default() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_delays(mut self, warmup: Duration, lookup: Duration, fetch: Duration) -> Self {
        self.warmup_delay_ms = warmup.as_millis() as u64;
        self.lookup_delay_ms = lookup.as_millis() as u64;
        self.fetch_delay_ms = fetch.as_millis() as u64;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: NonZeroUsize) -> Self {
        self.max_in_flight = max_in_flight.get();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn warmup_delay(&self) -> Duration {
        Duration::from_millis(self.warmup_delay_ms)
    }

    /// Pacing for per-meeting session lookups.
    pub fn lookup_pacing(&self) -> Pacing {
        Pacing::new(Duration::from_millis(self.lookup_delay_ms), self.in_flight())
    }

    /// Pacing for per-session fetches.
    pub fn fetch_pacing(&self) -> Pacing {
        Pacing::new(Duration::from_millis(self.fetch_delay_ms), self.in_flight())
    }

    fn in_flight(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_in_flight).unwrap_or(NonZeroUsize::MIN)
    }
}
