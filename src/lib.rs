//! Rate-limited aggregation of Formula 1 season data from the OpenF1 API.
//!
//! Paddock resolves a season year into race results joined per driver while
//! keeping request volume against the shared public API deliberately low.
//!
//! # Features
//!
//! - **Paced Fan-out**: one request per key, a fixed delay before each, output in key order
//! - **Season Pipeline**: seasons, meetings, race sessions, results and driver rosters
//! - **Standings Table**: points totals, per-race lookup and sortable columns
//! - **Stale-load Protection**: generation-tagged season selection
//! - **Offline Snapshots**: replay recorded API data without network access
//!
//! # Quick Start
//!
//! See the demos directory for a complete command-line example.
//!
//! ```rust,no_run
//! use paddock::Paddock;
//!
//! #[tokio::main]
//! async fn main() -> paddock::Result<()> {
//!     let pipeline = Paddock::connect()?;
//!
//!     let seasons = pipeline.available_seasons().await?;
//!     let standings = pipeline.season_standings(seasons[0]).await?;
//!
//!     for row in standings.rows() {
//!         println!("{:?}: {}", row.driver.full_name, row.total_points);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Data sources
pub mod provider;
pub mod providers;
pub mod stream;

// Aggregation
pub mod pipeline;
pub mod season;
pub mod standings;

// Core exports
pub use config::PipelineConfig;
pub use error::*;
pub use types::*;

// Main API exports
pub use pipeline::Pipeline;
pub use provider::{Endpoint, Provider};
pub use providers::{HttpProvider, Snapshot, SnapshotProvider};
pub use season::{SeasonSnapshot, SeasonView};
pub use standings::{SortColumn, SortDirection, Standings, StandingsRow};

/// Unified entry point for Paddock pipelines.
///
/// # Examples
///
/// ## Live API
/// ```rust,no_run
/// use paddock::Paddock;
///
/// #[tokio::main]
/// async fn main() -> paddock::Result<()> {
///     let pipeline = Paddock::connect()?;
///     let drivers = pipeline.drivers_for_year(2024).await?;
///     Ok(())
/// }
/// ```
///
/// ## Recorded Snapshot
/// ```rust,no_run
/// use paddock::Paddock;
///
/// #[tokio::main]
/// async fn main() -> paddock::Result<()> {
///     let pipeline = Paddock::open("season-2024.json")?;
///     let results = pipeline.results_for_year(2024).await?;
///     Ok(())
/// }
/// ```
pub struct Paddock;

impl Paddock {
    /// Pipeline over the public OpenF1 API with default pacing.
    pub fn connect() -> Result<Pipeline<HttpProvider>> {
        Self::connect_with(PipelineConfig::default())
    }

    /// Pipeline over the HTTP API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn connect_with(config: PipelineConfig) -> Result<Pipeline<HttpProvider>> {
        let provider = HttpProvider::new(&config)?;
        Ok(Pipeline::new(provider, config))
    }

    /// Pipeline over a recorded snapshot file, without request pacing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Pipeline<SnapshotProvider>> {
        let provider = SnapshotProvider::open(path)?;
        Ok(Pipeline::new(provider, PipelineConfig::unpaced()))
    }
}
