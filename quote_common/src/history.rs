//! Price history series and its compact text encoding.
//!
//! A history blob holds one point per line, `"<epoch millis>, <close>\n"`, oldest first.
//! Prices are written with Rust's shortest round-trip float formatting, so
//! `decode(encode(s)) == s` for every finite series. The reserved `INVALID_HISTORY_MARKER`
//! blob never comes out of [`encode`]: an encoded line always carries the delimiter and
//! an empty series encodes to the empty string.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::QuoteError;

/// Field delimiter inside one encoded line.
pub const FIELD_DELIMITER: &str = ", ";

/// Stored in place of a history blob for a symbol that has no valid quote data.
pub const INVALID_HISTORY_MARKER: &str = "INVALID";

/// One closing price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Milliseconds since the UNIX epoch.
    pub timestamp_ms: i64,
    /// Closing price.
    pub close: f64,
}

impl HistoryPoint {
    /// Build a point from a UTC instant.
    pub fn new(at: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp_ms: at.timestamp_millis(),
            close,
        }
    }

    /// The point's instant, `None` if the timestamp is outside chrono's range.
    pub fn at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// Granularity of a requested history series.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HistoryInterval {
    Daily,
    Weekly,
    Monthly,
}

impl HistoryInterval {
    /// Spacing between two consecutive points, in milliseconds.
    ///
    /// Months are approximated as 30 days; the value is only used to lay out
    /// synthetic series and to size buffers.
    pub fn step_ms(self) -> i64 {
        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        match self {
            HistoryInterval::Daily => DAY_MS,
            HistoryInterval::Weekly => 7 * DAY_MS,
            HistoryInterval::Monthly => 30 * DAY_MS,
        }
    }
}

/// Encode a series into a history blob.
pub fn encode(points: &[HistoryPoint]) -> String {
    let mut blob = String::with_capacity(points.len() * 24);
    for point in points {
        blob.push_str(&point.timestamp_ms.to_string());
        blob.push_str(FIELD_DELIMITER);
        blob.push_str(&point.close.to_string());
        blob.push('\n');
    }
    blob
}

/// Decode a history blob. Blank lines, including a trailing one, are ignored.
pub fn decode(blob: &str) -> Result<Vec<HistoryPoint>, QuoteError> {
    if is_invalid_marker(blob) {
        return Err(QuoteError::InvalidHistoryMarker);
    }

    let mut points = Vec::new();
    for (index, line) in blob.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |reason: String| QuoteError::History {
            line: index + 1,
            reason,
        };

        let (timestamp, close) = line
            .split_once(',')
            .ok_or_else(|| malformed(format!("missing delimiter in {:?}", line)))?;
        let timestamp_ms = timestamp
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed(format!("timestamp {:?}: {}", timestamp.trim(), e)))?;
        let close = close
            .trim()
            .parse::<f64>()
            .map_err(|e| malformed(format!("price {:?}: {}", close.trim(), e)))?;

        points.push(HistoryPoint {
            timestamp_ms,
            close,
        });
    }
    Ok(points)
}

/// True when `blob` is the reserved invalid-symbol marker.
pub fn is_invalid_marker(blob: &str) -> bool {
    blob.trim() == INVALID_HISTORY_MARKER
}
