//! Provider trait for season data sources

use std::fmt;

use crate::Result;
use crate::types::{Driver, Meeting, MeetingKey, Session, SessionKey, SessionResult};

/// Upstream query consumed by the pipeline
///
/// Renders as the relative path-and-query it is requested with, which is also
/// the label used in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/meetings`, optionally restricted to one season
    Meetings { year: Option<u32> },
    /// `/sessions?meeting_key=`
    SessionsForMeeting(MeetingKey),
    /// `/sessions?session_key=`
    Session(SessionKey),
    /// `/drivers?session_key=`
    DriversForSession(SessionKey),
    /// `/drivers?meeting_key=latest&session_key=latest`
    LatestDrivers,
    /// `/session_result?session_key=`
    SessionResults(SessionKey),
}

impl Endpoint {
    /// Resource path relative to the API root
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Meetings { .. } => "meetings",
            Endpoint::SessionsForMeeting(_) | Endpoint::Session(_) => "sessions",
            Endpoint::DriversForSession(_) | Endpoint::LatestDrivers => "drivers",
            Endpoint::SessionResults(_) => "session_result",
        }
    }

    /// Query parameters in request order
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Meetings { year: None } => Vec::new(),
            Endpoint::Meetings { year: Some(year) } => vec![("year", year.to_string())],
            Endpoint::SessionsForMeeting(key) => vec![("meeting_key", key.to_string())],
            Endpoint::Session(key)
            | Endpoint::DriversForSession(key)
            | Endpoint::SessionResults(key) => vec![("session_key", key.to_string())],
            Endpoint::LatestDrivers => {
                vec![("meeting_key", "latest".to_string()), ("session_key", "latest".to_string())]
            }
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())?;
        for (i, (name, value)) in self.query().iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

/// Trait for season data sources
///
/// Providers answer exactly one upstream query per call and never pace, retry
/// or cache; pacing belongs to the pipeline. Implementations must be shareable
/// across concurrently running pipeline invocations.
#[async_trait::async_trait]
pub trait Provider: Send + Sync + 'static {
    /// `GET /meetings`, or `/meetings?year=` when `year` is set
    async fn meetings(&self, year: Option<u32>) -> Result<Vec<Meeting>>;

    /// `GET /sessions?meeting_key=`
    async fn sessions_for_meeting(&self, meeting: MeetingKey) -> Result<Vec<Session>>;

    /// `GET /sessions?session_key=`
    ///
    /// Upstream answers with a list; it holds at most one record.
    async fn session(&self, session: SessionKey) -> Result<Vec<Session>>;

    /// `GET /drivers?session_key=`
    async fn drivers_for_session(&self, session: SessionKey) -> Result<Vec<Driver>>;

    /// `GET /drivers?meeting_key=latest&session_key=latest`
    async fn latest_drivers(&self) -> Result<Vec<Driver>>;

    /// `GET /session_result?session_key=`
    async fn session_results(&self, session: SessionKey) -> Result<Vec<SessionResult>>;
}
