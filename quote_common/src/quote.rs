//! Quote data model.
//!
//! `RemoteQuote` is what the quote source returns for one requested symbol; any figure may
//! be missing. `QuoteRecord` is the row the sync engine persists per watched symbol, with
//! its price history already encoded (see [`crate::history`]).

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::QuoteError;
use crate::history::{self, HistoryPoint};
use crate::symbol::Symbol;

/// Quote as reported by the remote source for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQuote {
    /// Symbol as echoed by the source.
    pub symbol: String,
    /// Last traded price; `None` when the source knows the symbol but has no price.
    pub price: Option<f64>,
    /// Absolute change since the previous close.
    pub change: Option<f64>,
    /// Change since the previous close, in percent.
    pub change_percent: Option<f64>,
}

/// Persisted quote row, keyed by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Unique key.
    pub symbol: Symbol,
    /// Last price.
    pub price: f64,
    /// Absolute change.
    pub change: f64,
    /// Percent change.
    pub change_percent: f64,
    /// Encoded history blob.
    pub history: String,
}

impl QuoteRecord {
    /// Decode the stored history blob.
    pub fn history_points(&self) -> Result<Vec<HistoryPoint>, QuoteError> {
        history::decode(&self.history)
    }

    /// Instant of the newest history point, if the blob decodes and is non-empty.
    pub fn latest_point_at(&self) -> Option<DateTime<Utc>> {
        self.history_points()
            .ok()?
            .iter()
            .map(|p| p.timestamp_ms)
            .max()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// True when the newest history point is older than `max_age` at `now`.
    ///
    /// Rows without a usable history are never reported stale.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.latest_point_at()
            .map(|latest| now - latest > max_age)
            .unwrap_or(false)
    }
}

/// Which change figure the front end shows next to the price.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayMode {
    Absolute,
    #[default]
    Percentage,
}

impl DisplayMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Absolute => DisplayMode::Percentage,
            DisplayMode::Percentage => DisplayMode::Absolute,
        }
    }

    /// Render the change column of `record` in this mode, with an explicit sign.
    pub fn format_change(self, record: &QuoteRecord) -> String {
        match self {
            DisplayMode::Absolute if record.change < 0.0 => format!("-${:.2}", -record.change),
            DisplayMode::Absolute => format!("+${:.2}", record.change),
            DisplayMode::Percentage => format!("{:+.2}%", record.change_percent),
        }
    }
}
