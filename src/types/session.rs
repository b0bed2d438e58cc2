//! Session records

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema-discovery")]
use std::collections::HashMap;

use super::{MeetingKey, SessionKey};

/// Session name that marks a grand prix race.
///
/// Matched exactly and case-sensitively; sprints ("Sprint") are not races.
pub const RACE_SESSION_NAME: &str = "Race";

/// One timed on-track segment of a meeting
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(default)]
pub struct Session {
    /// Unique session identifier
    pub session_key: SessionKey,
    /// Meeting this session belongs to
    pub meeting_key: MeetingKey,
    /// Display name ("Practice 1", "Qualifying", "Race", ...)
    pub session_name: Option<String>,
    /// Category ("Practice", "Qualifying", "Race")
    pub session_type: Option<String>,
    /// Host country
    pub country_name: Option<String>,
    /// Host country ISO code
    pub country_code: Option<String>,
    /// Circuit short name
    pub circuit_short_name: Option<String>,
    /// City or region
    pub location: Option<String>,
    /// Session start (ISO 8601)
    pub date_start: Option<String>,
    /// Session end (ISO 8601)
    pub date_end: Option<String>,
    /// Season
    pub year: Option<u32>,
    /// Unknown fields discovered during parsing (requires schema-discovery feature)
    #[cfg(feature = "schema-discovery")]
    #[serde(flatten)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[cfg_attr(feature = "tauri", specta(skip))]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Whether this session is a grand prix race.
    pub fn is_race(&self) -> bool {
        self.session_name.as_deref() == Some(RACE_SESSION_NAME)
    }
}
