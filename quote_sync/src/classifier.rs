//! Per-symbol validation of a batch fetch result.
//!
//! `classify` is pure: it only looks at the result set. Removing a rejected symbol from
//! the watch list and telling the user about it is up to the engine.

use quote_common::history::{self, HistoryPoint};
use quote_common::{QuoteRecord, Symbol};
use strum_macros::Display;

use crate::provider::QuoteSet;

/// Why a symbol was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum InvalidReason {
    /// The source returned nothing for the symbol.
    Missing,
    /// The source knows the symbol but reported no price.
    NoPrice,
    /// The reported price is not a finite number.
    UnparseablePrice,
}

/// Figures extracted from a usable quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteFigures {
    /// Last price.
    pub price: f64,
    /// Absolute change, zero when the source left it out.
    pub change: f64,
    /// Percent change, zero when the source left it out.
    pub change_percent: f64,
}

impl QuoteFigures {
    /// Build the row to persist. The series is stored oldest first.
    pub fn into_record(self, symbol: Symbol, mut series: Vec<HistoryPoint>) -> QuoteRecord {
        series.sort_by_key(|point| point.timestamp_ms);
        QuoteRecord {
            symbol,
            price: self.price,
            change: self.change,
            change_percent: self.change_percent,
            history: history::encode(&series),
        }
    }
}

/// Verdict for one requested symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// The quote is usable.
    Valid(QuoteFigures),
    /// The symbol has no usable quote.
    Invalid(InvalidReason),
}

/// Classify `symbol` against the batch `results`.
pub fn classify(symbol: &Symbol, results: &QuoteSet) -> Classification {
    let Some(quote) = results.get(symbol) else {
        return Classification::Invalid(InvalidReason::Missing);
    };
    let Some(price) = quote.price else {
        return Classification::Invalid(InvalidReason::NoPrice);
    };
    if !price.is_finite() {
        return Classification::Invalid(InvalidReason::UnparseablePrice);
    }

    let finite_or_zero = |value: Option<f64>| value.filter(|v| v.is_finite()).unwrap_or(0.0);
    Classification::Valid(QuoteFigures {
        price,
        change: finite_or_zero(quote.change),
        change_percent: finite_or_zero(quote.change_percent),
    })
}
