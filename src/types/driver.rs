//! Driver records

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema-discovery")]
use std::collections::HashMap;

use super::{DriverNumber, MeetingKey, SessionKey};

/// One driver as listed for a session by `/drivers`
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(default)]
pub struct Driver {
    /// Car number, the de-duplication key
    pub driver_number: DriverNumber,
    /// Full name (e.g. "Lewis HAMILTON")
    pub full_name: Option<String>,
    /// Team name
    pub team_name: Option<String>,
    /// Name shown on broadcast graphics
    pub broadcast_name: Option<String>,
    /// Three-letter acronym
    pub name_acronym: Option<String>,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Team colour (hex without `#`)
    pub team_colour: Option<String>,
    /// Headshot image URL
    pub headshot_url: Option<String>,
    /// Nationality ISO code
    pub country_code: Option<String>,
    /// Session the listing came from
    pub session_key: Option<SessionKey>,
    /// Meeting the listing came from
    pub meeting_key: Option<MeetingKey>,
    /// Unknown fields discovered during parsing (requires schema-discovery feature)
    #[cfg(feature = "schema-discovery")]
    #[serde(flatten)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[cfg_attr(feature = "tauri", specta(skip))]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}
