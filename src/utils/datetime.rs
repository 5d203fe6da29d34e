//! Datetime parsing and storage formatting
//!
//! Program instants are stored in SQLite as fixed-width RFC 3339 text with
//! microsecond precision (`2024-03-01T10:00:00.000000Z`). Keeping the width
//! constant makes lexicographic order equal to chronological order, which the
//! time-range query relies on. That only holds for years 0 through 9999, so
//! nothing outside [`DateTimeParser::is_storable`] may be written.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use thiserror::Error;

/// Errors that can occur during datetime operations
#[derive(Error, Debug)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected RFC3339 (2024-03-01T10:00:00Z) or 'YYYY-MM-DD HH:MM:SS'")]
    InvalidFormat { input: String },
}

/// Datetime parsing and formatting helpers
pub struct DateTimeParser;

impl DateTimeParser {
    /// Parse a datetime supplied by a client.
    ///
    /// Supports RFC 3339 with any offset and naive `YYYY-MM-DD HH:MM:SS` /
    /// `YYYY-MM-DDTHH:MM:SS` forms, which are taken as UTC.
    pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
        let trimmed = datetime_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive_formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
        ];

        for format in &naive_formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        Err(DateTimeError::InvalidFormat {
            input: datetime_str.to_string(),
        })
    }

    /// Format an instant for storage and range comparison.
    pub fn format_for_storage(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Whether `dt` keeps the four-digit year the storage format needs
    pub fn is_storable(dt: &DateTime<Utc>) -> bool {
        (0..=9999).contains(&dt.year())
    }

    /// Latest whole microsecond at or before `dt`
    pub fn floor_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
        dt.trunc_subsecs(6)
    }

    /// Earliest whole microsecond at or after `dt`
    pub fn ceil_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
        let floor = dt.trunc_subsecs(6);
        if floor == dt {
            return dt;
        }
        floor
            .checked_add_signed(Duration::microseconds(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Parse an instant previously written by [`DateTimeParser::format_for_storage`].
    pub fn parse_storage(stored: &str) -> Result<DateTime<Utc>, DateTimeError> {
        DateTime::parse_from_rfc3339(stored)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DateTimeError::InvalidFormat {
                input: stored.to_string(),
            })
    }
}
