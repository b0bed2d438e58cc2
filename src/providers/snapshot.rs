//! Snapshot provider for recorded API data

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::provider::Provider;
use crate::types::{Driver, Meeting, MeetingKey, Session, SessionKey, SessionResult};
use crate::{PaddockError, Result};

/// Recorded upstream records, answered offline by [`SnapshotProvider`]
///
/// The JSON layout holds one array per upstream collection, each element in
/// exactly the shape the live API returns.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(default)]
pub struct Snapshot {
    pub meetings: Vec<Meeting>,
    pub sessions: Vec<Session>,
    /// Per-session driver listings; `session_key` must be set
    pub drivers: Vec<Driver>,
    pub session_results: Vec<SessionResult>,
    /// Answer to the `latest` driver query
    pub latest_drivers: Vec<Driver>,
}

impl Snapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PaddockError::decode("snapshot", e))
    }

    /// Serialize the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PaddockError::decode("snapshot", e))
    }
}

/// Provider that answers queries from an in-memory [`Snapshot`]
///
/// Filters each collection the way the upstream query would and keeps the
/// recorded order.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    snapshot: Snapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot JSON file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PaddockError::file_error(path.to_path_buf(), e))?;
        let snapshot = Snapshot::from_json(&json)?;

        info!(
            path = %path.display(),
            meetings = snapshot.meetings.len(),
            sessions = snapshot.sessions.len(),
            results = snapshot.session_results.len(),
            "Opened snapshot"
        );

        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

fn select<T: Clone>(records: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    records.iter().filter(|r| keep(r)).cloned().collect()
}

#[async_trait::async_trait]
impl Provider for SnapshotProvider {
    async fn meetings(&self, year: Option<u32>) -> Result<Vec<Meeting>> {
        debug!(?year, "Snapshot meetings");
        Ok(select(&self.snapshot.meetings, |m| year.is_none_or(|y| m.year == y)))
    }

    async fn sessions_for_meeting(&self, meeting: MeetingKey) -> Result<Vec<Session>> {
        Ok(select(&self.snapshot.sessions, |s| s.meeting_key == meeting))
    }

    async fn session(&self, session: SessionKey) -> Result<Vec<Session>> {
        Ok(select(&self.snapshot.sessions, |s| s.session_key == session))
    }

    async fn drivers_for_session(&self, session: SessionKey) -> Result<Vec<Driver>> {
        Ok(select(&self.snapshot.drivers, |d| d.session_key == Some(session)))
    }

    async fn latest_drivers(&self) -> Result<Vec<Driver>> {
        Ok(self.snapshot.latest_drivers.clone())
    }

    async fn session_results(&self, session: SessionKey) -> Result<Vec<SessionResult>> {
        Ok(select(&self.snapshot.session_results, |r| r.session_key == session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[tokio::test]
    async fn queries_filter_like_upstream() {
        let provider = SnapshotProvider::new(test_utils::two_race_season());

        let meetings = provider.meetings(Some(2024)).await.unwrap();
        assert_eq!(meetings.len(), 2);
        assert!(provider.meetings(Some(1999)).await.unwrap().is_empty());

        let sessions = provider.sessions_for_meeting(MeetingKey(1001)).await.unwrap();
        let keys: Vec<_> = sessions.iter().map(|s| s.session_key).collect();
        assert_eq!(keys, vec![SessionKey(1), SessionKey(2)]);

        let drivers = provider.drivers_for_session(SessionKey(3)).await.unwrap();
        assert_eq!(drivers.len(), 2);

        let results = provider.session_results(SessionKey(2)).await.unwrap();
        assert!(results.iter().all(|r| r.session_key == SessionKey(2)));
    }

    #[test]
    fn snapshot_json_keeps_upstream_shapes() {
        let snapshot = test_utils::two_race_season();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"session_key\": 2"));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn malformed_snapshot_is_a_decode_error() {
        let err = Snapshot::from_json("{\"meetings\": 3}").unwrap_err();
        assert!(matches!(err, PaddockError::Decode { .. }));
    }

    #[test]
    fn missing_snapshot_file_is_a_file_error() {
        let err = SnapshotProvider::open("/nonexistent/season.json").unwrap_err();
        assert!(matches!(err, PaddockError::File { .. }));
    }
}
