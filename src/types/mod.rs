//! Core entity types for season data.
//!
//! The structures in this module mirror the JSON records published by the
//! OpenF1 API. Field names follow the upstream snake_case names so records
//! deserialize without renames, and every optional upstream attribute is an
//! `Option` so sparse records from older seasons still parse.
//!
//! ## Identifiers
//!
//! Upstream identifiers are bare integers. They are wrapped in transparent
//! newtypes so a session key can never be passed where a meeting key is
//! expected:
//! - [`MeetingKey`] identifies a race weekend
//! - [`SessionKey`] identifies one on-track session of a weekend
//! - [`DriverNumber`] identifies a competitor within a season
//!
//! ## Usage Example
//!
//! ```rust
//! use paddock::types::{Session, SessionKey};
//!
//! let json = r#"{"session_key": 9158, "meeting_key": 1229, "session_name": "Race"}"#;
//! let session: Session = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(session.session_key, SessionKey(9158));
//! assert!(session.is_race());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

mod driver;
mod meeting;
mod result;
mod session;

pub use driver::Driver;
pub use meeting::Meeting;
pub use result::SessionResult;
pub use session::{RACE_SESSION_NAME, Session};

macro_rules! key_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[cfg_attr(feature = "tauri", derive(specta::Type))]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

key_type!(
    /// Upstream `meeting_key`: one race weekend
    MeetingKey
);
key_type!(
    /// Upstream `session_key`: one practice, qualifying or race session
    SessionKey
);
key_type!(
    /// Upstream `driver_number`: stable per-season competitor identifier
    DriverNumber
);
