//! Meeting (race weekend) records

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema-discovery")]
use std::collections::HashMap;

use super::MeetingKey;

/// One race weekend as published by `/meetings`
///
/// Only `meeting_key` and `year` are interpreted by the pipeline; the rest is
/// carried through untouched for display.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(default)]
pub struct Meeting {
    /// Unique meeting identifier
    pub meeting_key: MeetingKey,
    /// Season the meeting belongs to
    pub year: u32,
    /// Short meeting name (e.g. "Bahrain Grand Prix")
    pub meeting_name: Option<String>,
    /// Sponsor-qualified official name
    pub meeting_official_name: Option<String>,
    /// Host country
    pub country_name: Option<String>,
    /// Host country ISO code
    pub country_code: Option<String>,
    /// Circuit short name
    pub circuit_short_name: Option<String>,
    /// City or region
    pub location: Option<String>,
    /// Start of the weekend (ISO 8601)
    pub date_start: Option<String>,
    /// Local offset from UTC (e.g. "03:00:00")
    pub gmt_offset: Option<String>,
    /// Unknown fields discovered during parsing (requires schema-discovery feature)
    #[cfg(feature = "schema-discovery")]
    #[serde(flatten)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[cfg_attr(feature = "tauri", specta(skip))]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}
