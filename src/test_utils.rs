//! Test utilities: season fixtures and a call-recording provider
//!
//! Shared by unit tests and (behind the `benchmark` feature) by the criterion
//! benches, so fixtures stay identical across both.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::provider::{Endpoint, Provider};
use crate::providers::Snapshot;
use crate::types::{
    Driver, DriverNumber, Meeting, MeetingKey, Session, SessionKey, SessionResult,
};
use crate::{PaddockError, Result, StatusCode};

/// Meeting fixture
pub fn meeting(key: u32, year: u32) -> Meeting {
    Meeting {
        meeting_key: MeetingKey(key),
        year,
        meeting_name: Some(format!("Grand Prix {key}")),
        ..Default::default()
    }
}

/// Session fixture
pub fn session(key: u32, meeting: u32, name: &str) -> Session {
    Session {
        session_key: SessionKey(key),
        meeting_key: MeetingKey(meeting),
        session_name: Some(name.to_string()),
        session_type: Some(name.split_whitespace().next().unwrap_or(name).to_string()),
        ..Default::default()
    }
}

/// Driver listing fixture
pub fn driver(number: u32, session: u32, full_name: &str, team: &str) -> Driver {
    Driver {
        driver_number: DriverNumber(number),
        full_name: Some(full_name.to_string()),
        team_name: Some(team.to_string()),
        session_key: Some(SessionKey(session)),
        ..Default::default()
    }
}

/// Classified result fixture
pub fn result(driver: u32, session: u32, position: Option<u32>, points: f64) -> SessionResult {
    SessionResult {
        driver_number: DriverNumber(driver),
        session_key: SessionKey(session),
        position,
        points: Some(points),
        ..Default::default()
    }
}

/// Season 2024 with two meetings and two races, plus meetings of other years.
///
/// - meetings (catalog order): 900/2023, 1001/2024, 901/2023, 1100/2025, 1002/2024
/// - meeting 1001: session 1 "Practice", session 2 "Race"
/// - meeting 1002: session 3 "Race"
/// - session 2 drivers: 1, 44; session 3 drivers: 1, 16; practice adds 55
/// - totals: #1 = 43, #16 = 25, #44 = 18 (its session 3 row is a DNF)
pub fn two_race_season() -> Snapshot {
    let mut dnf = result(44, 3, None, 1.0);
    dnf.dnf = true;

    Snapshot {
        meetings: vec![
            meeting(900, 2023),
            meeting(1001, 2024),
            meeting(901, 2023),
            meeting(1100, 2025),
            meeting(1002, 2024),
        ],
        sessions: vec![
            session(1, 1001, "Practice"),
            session(2, 1001, "Race"),
            session(3, 1002, "Race"),
        ],
        drivers: vec![
            driver(1, 1, "Max VERSTAPPEN", "Red Bull Racing"),
            driver(55, 1, "Carlos SAINZ", "Ferrari"),
            driver(1, 2, "Max VERSTAPPEN", "Red Bull Racing"),
            driver(44, 2, "Lewis HAMILTON", "Mercedes"),
            driver(1, 3, "Max VERSTAPPEN", "Red Bull Racing"),
            driver(16, 3, "Charles LECLERC", "Ferrari"),
        ],
        session_results: vec![
            result(1, 2, Some(1), 25.0),
            result(44, 2, Some(2), 18.0),
            result(16, 3, Some(1), 25.0),
            result(1, 3, Some(2), 18.0),
            dnf,
        ],
        latest_drivers: vec![
            driver(1, 3, "Max VERSTAPPEN", "Red Bull Racing"),
            driver(16, 3, "Charles LECLERC", "Ferrari"),
        ],
    }
}

/// Generated season with `drivers` entrants and `races` races, for benches.
pub fn synthetic_season(year: u32, drivers: u32, races: u32) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for race in 0..races {
        let meeting_key = year * 100 + race;
        let session_key = meeting_key * 10;
        snapshot.meetings.push(meeting(meeting_key, year));
        snapshot.sessions.push(session(session_key - 1, meeting_key, "Qualifying"));
        snapshot.sessions.push(session(session_key, meeting_key, "Race"));
        for n in 0..drivers {
            let number = n + 1;
            // Rotate the finishing order every race
            let position = (n + race) % drivers + 1;
            let points = 26u32.saturating_sub(position * 2) as f64;
            snapshot.drivers.push(driver(
                number,
                session_key,
                &format!("Driver {number:02}"),
                &format!("Team {}", n / 2),
            ));
            snapshot.session_results.push(result(number, session_key, Some(position), points));
        }
    }
    snapshot
}

/// One call observed by [`RecordingProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub started: Instant,
    pub finished: Option<Instant>,
}

/// Provider wrapper that records every call and can inject latency or failures
pub struct RecordingProvider<P> {
    inner: P,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Duration,
    slow: HashMap<Endpoint, Duration>,
    failing: HashSet<Endpoint>,
}

impl<P: Provider> RecordingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
            slow: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    /// Simulated round-trip time applied to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Extra round-trip time for one endpoint
    pub fn with_slow(mut self, endpoint: Endpoint, latency: Duration) -> Self {
        self.slow.insert(endpoint, latency);
        self
    }

    /// Answer `endpoint` with a 503
    pub fn with_failure(mut self, endpoint: Endpoint) -> Self {
        self.failing.insert(endpoint);
        self
    }

    /// Calls observed so far, in issue order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Endpoints requested so far, in issue order
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    async fn observe<T>(&self, endpoint: Endpoint, answer: Result<Vec<T>>) -> Result<Vec<T>> {
        let index = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(RecordedCall { endpoint, started: Instant::now(), finished: None });
            calls.len() - 1
        };

        let latency = self.latency + self.slow.get(&endpoint).copied().unwrap_or_default();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.calls.lock().unwrap_or_else(PoisonError::into_inner)[index].finished =
            Some(Instant::now());

        if self.failing.contains(&endpoint) {
            return Err(PaddockError::status(endpoint, StatusCode::SERVICE_UNAVAILABLE, "injected"));
        }
        answer
    }
}

#[async_trait::async_trait]
impl<P: Provider> Provider for RecordingProvider<P> {
    async fn meetings(&self, year: Option<u32>) -> Result<Vec<Meeting>> {
        let answer = self.inner.meetings(year).await;
        self.observe(Endpoint::Meetings { year }, answer).await
    }

    async fn sessions_for_meeting(&self, meeting: MeetingKey) -> Result<Vec<Session>> {
        let answer = self.inner.sessions_for_meeting(meeting).await;
        self.observe(Endpoint::SessionsForMeeting(meeting), answer).await
    }

    async fn session(&self, session: SessionKey) -> Result<Vec<Session>> {
        let answer = self.inner.session(session).await;
        self.observe(Endpoint::Session(session), answer).await
    }

    async fn drivers_for_session(&self, session: SessionKey) -> Result<Vec<Driver>> {
        let answer = self.inner.drivers_for_session(session).await;
        self.observe(Endpoint::DriversForSession(session), answer).await
    }

    async fn latest_drivers(&self) -> Result<Vec<Driver>> {
        let answer = self.inner.latest_drivers().await;
        self.observe(Endpoint::LatestDrivers, answer).await
    }

    async fn session_results(&self, session: SessionKey) -> Result<Vec<SessionResult>> {
        let answer = self.inner.session_results(session).await;
        self.observe(Endpoint::SessionResults(session), answer).await
    }
}
