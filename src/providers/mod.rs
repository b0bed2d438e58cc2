//! Data source implementations

pub mod http;
pub mod snapshot;

pub use http::HttpProvider;
pub use snapshot::{Snapshot, SnapshotProvider};
