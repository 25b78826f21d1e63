//! Remote quote source abstraction.
//!
//! The engine talks to the quote source only through `QuoteProvider`, so the TCP client
//! in [`crate::tcp`] can be swapped for a scripted provider in tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quote_common::{HistoryInterval, HistoryPoint, RemoteQuote, Result, Symbol};

/// Batch fetch result keyed by symbol. Symbols the source does not know are absent.
pub type QuoteSet = HashMap<Symbol, RemoteQuote>;

/// Source of quotes and price history.
///
/// Both calls block until the source answers or its own timeout expires; an `Err` means
/// the source could not be reached or answered garbage, never that a symbol is unknown.
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch current quotes for all `symbols` in one request.
    fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<QuoteSet>;

    /// Fetch the closing prices of `symbol` between `from` and `to`.
    fn fetch_history(
        &self,
        symbol: &Symbol,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>>;
}
