//! Error types for season data aggregation.
//!
//! Every pipeline stage returns the first failure it meets, unchanged, to its
//! caller. Nothing in this crate retries; [`PaddockError::is_retryable`] and
//! [`PaddockError::recovery_suggestions`] only classify failures so the
//! consuming application can decide what to tell the user.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: the request never produced an HTTP response
//! - **Status Errors**: the upstream service answered with a non-success code
//! - **Decode Errors**: the response body did not match the expected shape
//! - **Configuration Errors**: invalid settings or unreadable config/snapshot files
//! - **Superseded**: a season load was overtaken by a newer selection
//!
//! ```rust
//! use paddock::PaddockError;
//!
//! let error = PaddockError::config("max_in_flight must be at least 1");
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

pub use reqwest::StatusCode;

/// Result type alias for pipeline operations.
pub type Result<T, E = PaddockError> = std::result::Result<T, E>;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PaddockError {
    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upstream responded to {endpoint} with {status}: {body}")]
    Status { endpoint: String, status: StatusCode, body: String },

    #[error("Malformed response from {context}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Failed to parse configuration")]
    ConfigParse {
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Load of season {year} (generation {generation}) was superseded")]
    Superseded { year: u32, generation: u64 },
}

impl PaddockError {
    /// Returns whether repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaddockError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            PaddockError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            PaddockError::Decode { .. } => false,
            PaddockError::Config { .. } => false,
            PaddockError::ConfigParse { .. } => false,
            PaddockError::File { .. } => false,
            PaddockError::Superseded { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PaddockError::Transport { .. } => vec![
                "Check network connectivity",
                "Verify the configured base URL",
                "Increase the request timeout",
            ],
            PaddockError::Status { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS => vec![
                "Increase the configured request delays",
                "Lower max_in_flight to 1",
                "Wait before loading another season",
            ],
            PaddockError::Status { .. } => vec![
                "Check the requested season exists upstream",
                "Check the upstream service status",
            ],
            PaddockError::Decode { .. } => vec![
                "Check the upstream API version",
                "Enable the schema-discovery feature to inspect unknown fields",
            ],
            PaddockError::Config { .. } | PaddockError::ConfigParse { .. } => vec![
                "Check the configuration values",
                "Remove the config file to fall back to defaults",
            ],
            PaddockError::File { .. } => {
                vec!["Check the file exists and is readable", "Check file permissions"]
            }
            PaddockError::Superseded { .. } => {
                vec!["Nothing to do, a newer season selection is being loaded"]
            }
        }
    }

    /// Helper constructor for transport failures.
    pub fn transport(endpoint: impl ToString, source: reqwest::Error) -> Self {
        PaddockError::Transport { endpoint: endpoint.to_string(), source }
    }

    /// Helper constructor for non-success responses.
    pub fn status(endpoint: impl ToString, status: StatusCode, body: impl Into<String>) -> Self {
        PaddockError::Status { endpoint: endpoint.to_string(), status, body: body.into() }
    }

    /// Helper constructor for malformed bodies.
    pub fn decode(context: impl ToString, source: serde_json::Error) -> Self {
        PaddockError::Decode { context: context.to_string(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        PaddockError::Config { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PaddockError::File { path, source }
    }
}

impl From<serde_yaml_ng::Error> for PaddockError {
    fn from(source: serde_yaml_ng::Error) -> Self {
        PaddockError::ConfigParse { source }
    }
}
