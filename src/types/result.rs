//! Session result records

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "schema-discovery")]
use std::collections::HashMap;

use super::{DriverNumber, MeetingKey, SessionKey};

/// One driver's classified outcome in one session, from `/session_result`
///
/// Keyed by (`driver_number`, `session_key`).
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(default)]
pub struct SessionResult {
    /// Driver the row belongs to
    pub driver_number: DriverNumber,
    /// Session the row belongs to
    pub session_key: SessionKey,
    /// Meeting of the session
    pub meeting_key: Option<MeetingKey>,
    /// Finishing position, absent when unclassified
    pub position: Option<u32>,
    /// Championship points awarded (half points exist)
    pub points: Option<f64>,
    /// Did not start
    #[serde(deserialize_with = "null_as_false")]
    pub dns: bool,
    /// Did not finish
    #[serde(deserialize_with = "null_as_false")]
    pub dnf: bool,
    /// Disqualified
    #[serde(deserialize_with = "null_as_false")]
    pub dsq: bool,
    /// Laps completed
    pub number_of_laps: Option<u32>,
    /// Unknown fields discovered during parsing (requires schema-discovery feature)
    #[cfg(feature = "schema-discovery")]
    #[serde(flatten)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[cfg_attr(feature = "tauri", specta(skip))]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl SessionResult {
    /// Points this row contributes to a season total.
    ///
    /// DNS and DNF rows count for nothing; a missing `points` value counts as 0.
    pub fn scoring_points(&self) -> f64 {
        if self.dns || self.dnf { 0.0 } else { self.points.unwrap_or(0.0) }
    }
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_row() {
        let json = r#"{
            "position": 1, "driver_number": 1, "number_of_laps": 57, "points": 26.0,
            "dnf": false, "dns": false, "dsq": false, "duration": 5504.742,
            "gap_to_leader": 0, "meeting_key": 1229, "session_key": 9472
        }"#;
        let row: SessionResult = serde_json::from_str(json).unwrap();

        assert_eq!(row.driver_number, DriverNumber(1));
        assert_eq!(row.session_key, SessionKey(9472));
        assert_eq!(row.position, Some(1));
        assert_eq!(row.scoring_points(), 26.0);
    }

    #[test]
    fn retired_rows_score_nothing() {
        let dnf = SessionResult { points: Some(1.0), dnf: true, ..Default::default() };
        let dns = SessionResult { points: Some(1.0), dns: true, ..Default::default() };
        let unscored = SessionResult { points: None, ..Default::default() };

        assert_eq!(dnf.scoring_points(), 0.0);
        assert_eq!(dns.scoring_points(), 0.0);
        assert_eq!(unscored.scoring_points(), 0.0);
    }

    #[test]
    fn null_position_parses_as_unclassified() {
        let json = r#"{"driver_number": 2, "session_key": 3, "position": null, "dnf": true, "dns": null}"#;
        let row: SessionResult = serde_json::from_str(json).unwrap();
        assert_eq!(row.position, None);
        assert!(row.dnf);
        assert!(!row.dns);
    }
}
