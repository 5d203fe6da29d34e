//! Utility modules for the radio scheduler
//!
//! - `utils::datetime` for instant parsing and storage formatting
//! - `utils::duration_serde` for human-readable program durations

pub mod datetime;
pub mod duration_serde;
