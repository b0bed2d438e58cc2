//! Stream utilities for paced request fan-out

mod pace;

pub use pace::{PaceExt, Paced, Pacing, paced_fan_out};
