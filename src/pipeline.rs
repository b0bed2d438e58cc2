//! Season aggregation pipeline
//!
//! Resolves a season year into meetings, race sessions, results and a driver
//! roster. Every fan-out over a key set goes through
//! [`paced_fan_out`](crate::stream::paced_fan_out), so one invocation never
//! issues more than `max_in_flight` requests at once and waits the configured
//! delay before each of them.
//!
//! ```text
//! year ─► meetings ─► meeting keys ─► race session keys ─┬─► results
//!                                                        ├─► drivers (deduplicated)
//!                                                        └─► session details
//! ```
//!
//! Invocations share nothing but the provider, so callers may run several of
//! them at once (see [`Pipeline::season_standings`]). Any failure ends the
//! invocation with that error; nothing is retried or partially returned.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::provider::Provider;
use crate::standings::Standings;
use crate::stream::{Pacing, paced_fan_out};
use crate::types::{Driver, DriverNumber, Meeting, MeetingKey, Session, SessionKey, SessionResult};
use crate::{PipelineConfig, Result};

/// Distinct season years, most recent first.
pub fn distinct_seasons(meetings: &[Meeting]) -> Vec<u32> {
    let mut years: Vec<u32> = meetings.iter().map(|m| m.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Keys of the sessions named exactly "Race", in input order.
pub fn race_session_keys_of(sessions: &[Session]) -> Vec<SessionKey> {
    sessions.iter().filter(|s| s.is_race()).map(|s| s.session_key).collect()
}

/// Drop repeated driver numbers, keeping each driver's first record.
pub fn dedup_drivers(drivers: impl IntoIterator<Item = Driver>) -> Vec<Driver> {
    let mut seen = HashSet::new();
    drivers.into_iter().filter(|d| seen.insert(d.driver_number)).collect()
}

/// Season points of one driver: DNS and DNF rows excluded.
pub fn total_points(results: &[SessionResult], driver: DriverNumber) -> f64 {
    results.iter().filter(|r| r.driver_number == driver).map(SessionResult::scoring_points).sum()
}

/// Rate-limited season data pipeline over a [`Provider`]
pub struct Pipeline<P> {
    provider: Arc<P>,
    config: PipelineConfig,
}

impl<P> Clone for Pipeline<P> {
    fn clone(&self) -> Self {
        Self { provider: Arc::clone(&self.provider), config: self.config.clone() }
    }
}

impl<P: Provider> Pipeline<P> {
    pub fn new(provider: P, config: PipelineConfig) -> Self {
        Self::with_shared(Arc::new(provider), config)
    }

    /// Build a pipeline over a provider that other owners keep using.
    pub fn with_shared(provider: Arc<P>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Every season present in the meeting catalog, most recent first.
    pub async fn available_seasons(&self) -> Result<Vec<u32>> {
        let started = stage_started("available_seasons", 1);
        let meetings = self.provider.meetings(None).await?;
        let seasons = distinct_seasons(&meetings);
        stage_finished("available_seasons", 1, seasons.len(), started);
        Ok(seasons)
    }

    /// Meetings of `year` in upstream order, requested after the warm-up delay.
    pub async fn meetings_for_year(&self, year: u32) -> Result<Vec<Meeting>> {
        let started = stage_started("meetings_for_year", 1);
        let warmup = self.config.warmup_delay();
        if !warmup.is_zero() {
            tokio::time::sleep(warmup).await;
        }
        let meetings = self.provider.meetings(Some(year)).await?;
        stage_finished("meetings_for_year", 1, meetings.len(), started);
        Ok(meetings)
    }

    /// Keys of the race sessions held at `meetings`, in meeting order.
    pub async fn race_session_keys(&self, meetings: &[MeetingKey]) -> Result<Vec<SessionKey>> {
        let started = stage_started("race_session_keys", meetings.len());
        let provider = &*self.provider;
        let sessions = paced_fan_out(meetings.iter().copied(), self.config.lookup_pacing(), |key| {
            provider.sessions_for_meeting(key)
        })
        .await?;

        let keys = race_session_keys_of(&sessions);
        debug!(sessions = sessions.len(), races = keys.len(), "Filtered race sessions");
        stage_finished("race_session_keys", meetings.len(), keys.len(), started);
        Ok(keys)
    }

    /// Full session records for `sessions`, in key order.
    pub async fn sessions_by_keys(&self, sessions: &[SessionKey]) -> Result<Vec<Session>> {
        let started = stage_started("sessions_by_keys", sessions.len());
        let provider = &*self.provider;
        let records = self.fetch_per_session(sessions, |key| provider.session(key)).await?;
        stage_finished("sessions_by_keys", sessions.len(), records.len(), started);
        Ok(records)
    }

    /// Result rows of `sessions`, flattened in key order.
    pub async fn results_by_session_keys(
        &self,
        sessions: &[SessionKey],
    ) -> Result<Vec<SessionResult>> {
        let started = stage_started("results_by_session_keys", sessions.len());
        let provider = &*self.provider;
        let rows = self.fetch_per_session(sessions, |key| provider.session_results(key)).await?;
        stage_finished("results_by_session_keys", sessions.len(), rows.len(), started);
        Ok(rows)
    }

    /// Drivers listed in `sessions`, one record per driver number.
    ///
    /// The first listing of a driver wins; roster order is order of first
    /// appearance across the session sequence.
    pub async fn drivers_by_session_keys(&self, sessions: &[SessionKey]) -> Result<Vec<Driver>> {
        let started = stage_started("drivers_by_session_keys", sessions.len());
        let provider = &*self.provider;
        let listings =
            self.fetch_per_session(sessions, |key| provider.drivers_for_session(key)).await?;
        let listed = listings.len();
        let roster = dedup_drivers(listings);
        debug!(listed, distinct = roster.len(), "Deduplicated drivers");
        stage_finished("drivers_by_session_keys", sessions.len(), roster.len(), started);
        Ok(roster)
    }

    /// Race session keys of `year`.
    pub async fn race_session_keys_for_year(&self, year: u32) -> Result<Vec<SessionKey>> {
        let meetings = self.meetings_for_year(year).await?;
        let keys: Vec<MeetingKey> = meetings.iter().map(|m| m.meeting_key).collect();
        self.race_session_keys(&keys).await
    }

    /// Deduplicated driver roster of the races of `year`.
    pub async fn drivers_for_year(&self, year: u32) -> Result<Vec<Driver>> {
        let sessions = self.race_session_keys_for_year(year).await?;
        self.drivers_by_session_keys(&sessions).await
    }

    /// Every result row of the races of `year`.
    pub async fn results_for_year(&self, year: u32) -> Result<Vec<SessionResult>> {
        let sessions = self.race_session_keys_for_year(year).await?;
        self.results_by_session_keys(&sessions).await
    }

    /// Full session records of the races of `year`.
    pub async fn race_sessions_for_year(&self, year: u32) -> Result<Vec<Session>> {
        let sessions = self.race_session_keys_for_year(year).await?;
        self.sessions_by_keys(&sessions).await
    }

    /// Drivers entered in the most recent session.
    pub async fn current_drivers(&self) -> Result<Vec<Driver>> {
        let started = stage_started("current_drivers", 1);
        let drivers = self.provider.latest_drivers().await?;
        stage_finished("current_drivers", 1, drivers.len(), started);
        Ok(drivers)
    }

    /// Joined standings table of `year`, sorted by points.
    ///
    /// Runs the session, driver and result chains side by side; each chain
    /// keeps its own requests sequential. The first failure of any chain
    /// abandons the others.
    pub async fn season_standings(&self, year: u32) -> Result<Standings> {
        info!(year, "Loading season standings");
        let (sessions, drivers, results) = tokio::try_join!(
            self.race_sessions_for_year(year),
            self.drivers_for_year(year),
            self.results_for_year(year),
        )?;
        Ok(Standings::new(drivers, sessions, results).for_season(year))
    }

    async fn fetch_per_session<T, F, Fut>(&self, sessions: &[SessionKey], fetch: F) -> Result<Vec<T>>
    where
        F: FnMut(SessionKey) -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>>>,
    {
        let pacing: Pacing = self.config.fetch_pacing();
        paced_fan_out(sessions.iter().copied(), pacing, fetch).await
    }
}

fn stage_started(stage: &'static str, requests: usize) -> Instant {
    debug!(stage, requests, "Stage started");
    Instant::now()
}

fn stage_finished(stage: &'static str, requests: usize, rows: usize, started: Instant) {
    info!(
        stage,
        requests,
        rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Stage finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaddockError;
    use crate::provider::Endpoint;
    use crate::providers::SnapshotProvider;
    use crate::test_utils::{self, RecordingProvider};
    use std::time::Duration;

    type Recorded = RecordingProvider<SnapshotProvider>;

    fn recorded_pipeline(config: PipelineConfig) -> Pipeline<Recorded> {
        let provider = RecordingProvider::new(SnapshotProvider::new(test_utils::two_race_season()));
        Pipeline::new(provider, config)
    }

    fn paced_config() -> PipelineConfig {
        PipelineConfig::default().with_delays(
            Duration::from_millis(500),
            Duration::from_millis(1000),
            Duration::from_millis(300),
        )
    }

    #[tokio::test]
    async fn seasons_are_distinct_and_descending() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());
        assert_eq!(pipeline.available_seasons().await.unwrap(), vec![2025, 2024, 2023]);
        assert_eq!(pipeline.provider().endpoints(), vec![Endpoint::Meetings { year: None }]);
    }

    #[tokio::test(start_paused = true)]
    async fn meetings_wait_for_warmup() {
        let pipeline = recorded_pipeline(paced_config());
        let started = tokio::time::Instant::now();

        let meetings = pipeline.meetings_for_year(2024).await.unwrap();

        let keys: Vec<_> = meetings.iter().map(|m| m.meeting_key).collect();
        assert_eq!(keys, vec![MeetingKey(1001), MeetingKey(1002)]);
        let call = &pipeline.provider().calls()[0];
        assert!(call.started - started >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn race_keys_follow_meeting_order() {
        let pipeline = recorded_pipeline(paced_config());

        let keys = pipeline.race_session_keys(&[MeetingKey(1001), MeetingKey(1002)]).await.unwrap();

        assert_eq!(keys, vec![SessionKey(2), SessionKey(3)]);
        assert_eq!(
            pipeline.provider().endpoints(),
            vec![
                Endpoint::SessionsForMeeting(MeetingKey(1001)),
                Endpoint::SessionsForMeeting(MeetingKey(1002)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn results_for_year_issues_one_sequential_request_per_race() {
        let provider = RecordingProvider::new(SnapshotProvider::new(test_utils::two_race_season()))
            .with_latency(Duration::from_millis(40));
        let pipeline = Pipeline::new(provider, paced_config());

        let rows = pipeline.results_for_year(2024).await.unwrap();

        let keys: Vec<_> = rows.iter().map(|r| (r.session_key.0, r.driver_number.0)).collect();
        assert_eq!(keys, vec![(2, 1), (2, 44), (3, 16), (3, 1), (3, 44)]);

        let calls = pipeline.provider().calls();
        let result_calls: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c.endpoint, Endpoint::SessionResults(_)))
            .collect();
        assert_eq!(
            result_calls.iter().map(|c| c.endpoint).collect::<Vec<_>>(),
            vec![
                Endpoint::SessionResults(SessionKey(2)),
                Endpoint::SessionResults(SessionKey(3)),
            ]
        );

        // Never overlapping, and always at least the fetch delay apart
        for pair in calls.windows(2) {
            let previous_end = pair[0].finished.expect("call finished");
            assert!(pair[1].started >= previous_end);
        }
        for pair in result_calls.windows(2) {
            let gap = pair[1].started - pair[0].finished.expect("call finished");
            assert!(gap >= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn roster_keeps_first_listing() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());

        let roster = pipeline.drivers_by_session_keys(&[SessionKey(2), SessionKey(3)]).await.unwrap();

        let numbers: Vec<u32> = roster.iter().map(|d| d.driver_number.0).collect();
        assert_eq!(numbers, vec![1, 44, 16]);
        assert_eq!(roster[0].session_key, Some(SessionKey(2)));
    }

    #[tokio::test]
    async fn drivers_for_year_skips_practice_entrants() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());

        let roster = pipeline.drivers_for_year(2024).await.unwrap();

        assert!(roster.iter().all(|d| d.driver_number != DriverNumber(55)));
        assert_eq!(roster.len(), 3);
    }

    #[tokio::test]
    async fn race_sessions_for_year_returns_details() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());

        let sessions = pipeline.race_sessions_for_year(2024).await.unwrap();

        let keys: Vec<_> = sessions.iter().map(|s| s.session_key).collect();
        assert_eq!(keys, vec![SessionKey(2), SessionKey(3)]);
        assert!(pipeline.provider().endpoints().contains(&Endpoint::Session(SessionKey(3))));
    }

    #[tokio::test]
    async fn current_drivers_uses_latest_query() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());
        let drivers = pipeline.current_drivers().await.unwrap();
        assert_eq!(drivers.len(), 2);
        assert_eq!(pipeline.provider().endpoints(), vec![Endpoint::LatestDrivers]);
    }

    #[tokio::test]
    async fn failing_lookup_aborts_the_chain() {
        let provider = RecordingProvider::new(SnapshotProvider::new(test_utils::two_race_season()))
            .with_failure(Endpoint::SessionsForMeeting(MeetingKey(1001)));
        let pipeline = Pipeline::new(provider, PipelineConfig::unpaced());

        let err = pipeline.results_for_year(2024).await.unwrap_err();

        assert!(matches!(err, PaddockError::Status { .. }));
        let endpoints = pipeline.provider().endpoints();
        assert_eq!(
            endpoints,
            vec![
                Endpoint::Meetings { year: Some(2024) },
                Endpoint::SessionsForMeeting(MeetingKey(1001)),
            ]
        );
    }

    #[tokio::test]
    async fn season_standings_joins_all_three_chains() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());

        let standings = pipeline.season_standings(2024).await.unwrap();

        assert_eq!(standings.season(), Some(2024));
        assert_eq!(standings.sessions().len(), 2);
        let order: Vec<u32> = standings.drivers().iter().map(|d| d.driver_number.0).collect();
        assert_eq!(order, vec![1, 16, 44]);
        assert_eq!(standings.total_points(DriverNumber(1)), 43.0);
    }

    #[tokio::test]
    async fn unknown_year_yields_empty_lists() {
        let pipeline = recorded_pipeline(PipelineConfig::unpaced());
        assert!(pipeline.results_for_year(1999).await.unwrap().is_empty());
        assert!(pipeline.drivers_for_year(1999).await.unwrap().is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn race_or_not() -> impl Strategy<Value = String> {
            prop::sample::select(vec!["Race", "race", "Sprint", "Practice 1", "Qualifying", "Race "])
                .prop_map(str::to_string)
        }

        proptest! {
          #[test]
          fn seasons_listed_once_in_descending_order(years in prop::collection::vec(1950u32..2100, 0..40)) {
            let meetings: Vec<Meeting> = years.iter().enumerate()
              .map(|(i, y)| test_utils::meeting(i as u32, *y))
              .collect();
            let seasons = distinct_seasons(&meetings);

            prop_assert!(seasons.windows(2).all(|w| w[0] > w[1]));
            let expected: HashSet<u32> = years.iter().copied().collect();
            prop_assert_eq!(seasons.len(), expected.len());
            prop_assert!(seasons.iter().all(|y| expected.contains(y)));
          }

          #[test]
          fn race_filter_is_exact_and_stable(names in prop::collection::vec(race_or_not(), 0..30)) {
            let sessions: Vec<Session> = names.iter().enumerate()
              .map(|(i, n)| test_utils::session(i as u32, 1, n))
              .collect();
            let keys = race_session_keys_of(&sessions);

            let expected: Vec<SessionKey> = names.iter().enumerate()
              .filter(|(_, n)| n.as_str() == "Race")
              .map(|(i, _)| SessionKey(i as u32))
              .collect();
            prop_assert_eq!(keys, expected);
          }

          #[test]
          fn roster_has_each_number_once_with_first_record(
            entries in prop::collection::vec((1u32..30, 0u32..5), 0..60)
          ) {
            let drivers: Vec<Driver> = entries.iter()
              .map(|(number, session)| test_utils::driver(*number, *session, "X", "Y"))
              .collect();
            let roster = dedup_drivers(drivers.clone());

            let mut seen = HashSet::new();
            let expected: Vec<&Driver> = drivers.iter().filter(|d| seen.insert(d.driver_number)).collect();
            prop_assert_eq!(roster.iter().collect::<Vec<_>>(), expected);
          }

          #[test]
          fn points_skip_dns_and_dnf(
            rows in prop::collection::vec((1u32..4, 0u32..27, any::<bool>(), any::<bool>()), 0..40)
          ) {
            let results: Vec<SessionResult> = rows.iter().enumerate()
              .map(|(i, (driver, points, dns, dnf))| {
                let mut row = test_utils::result(*driver, i as u32, None, *points as f64);
                row.dns = *dns;
                row.dnf = *dnf;
                row
              })
              .collect();

            for driver in 1..4 {
              let expected: u32 = rows.iter()
                .filter(|(d, _, dns, dnf)| *d == driver && !dns && !dnf)
                .map(|(_, p, _, _)| *p)
                .sum();
              prop_assert_eq!(total_points(&results, DriverNumber(driver)), expected as f64);
            }
          }
        }
    }
}
