//! Simulated market state.
//!
//! The `Market` keeps a last price and a previous close per `Ticker` and moves prices
//! with a small random walk. Batch quote requests are answered from that state; history
//! requests get a synthetic series that is reproducible for a given ticker and range.

use std::collections::{HashMap, HashSet};

use quote_common::{HistoryInterval, HistoryPoint, QuoteError, RemoteQuote};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;

use crate::model::tickers::Ticker;

/// Longest history series the server will produce for one request.
pub const MAX_HISTORY_POINTS: usize = 2_000;

#[derive(Debug, Clone, Copy)]
struct PriceState {
    price: f64,
    previous_close: f64,
}

/// Prices of every known ticker.
#[derive(Debug)]
pub struct Market {
    prices: HashMap<Ticker, PriceState>,
    halted: HashSet<Ticker>,
}

impl Market {
    /// Market at base prices. `halted` tickers are reported without a price.
    pub fn new(halted: HashSet<Ticker>) -> Self {
        let prices = Ticker::iter()
            .map(|ticker| {
                let base = ticker.base_price();
                (
                    ticker,
                    PriceState {
                        price: base,
                        previous_close: base,
                    },
                )
            })
            .collect();
        Self { prices, halted }
    }

    /// Calculate the next price using a small random walk around `current_price`.
    ///
    /// The change is sampled uniformly from `[-1%, +1%]` and the result is clamped to a
    /// minimum positive value.
    pub fn next_price(current_price: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-0.01..0.01);
        let new_price = current_price * (1.0 + change);
        new_price.max(0.01)
    }

    /// Move every price one tick.
    pub fn step(&mut self) {
        for state in self.prices.values_mut() {
            state.price = Self::next_price(state.price);
        }
    }

    /// Quotes for the known tickers among `symbols`; unknown symbols are left out.
    pub fn quotes(&self, symbols: &[String]) -> Vec<RemoteQuote> {
        symbols
            .iter()
            .filter_map(|symbol| {
                let ticker = symbol.parse::<Ticker>().ok()?;
                let state = self.prices.get(&ticker)?;
                if self.halted.contains(&ticker) {
                    return Some(RemoteQuote {
                        symbol: ticker.to_string(),
                        price: None,
                        change: None,
                        change_percent: None,
                    });
                }
                let change = state.price - state.previous_close;
                Some(RemoteQuote {
                    symbol: ticker.to_string(),
                    price: Some(round_cents(state.price)),
                    change: Some(round_cents(change)),
                    change_percent: Some(round_cents(change / state.previous_close * 100.0)),
                })
            })
            .collect()
    }

    /// Closing prices of `symbol` from `from_ms` to `to_ms`, newest first.
    pub fn history(
        &self,
        symbol: &str,
        from_ms: i64,
        to_ms: i64,
        interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>, QuoteError> {
        let ticker = symbol
            .parse::<Ticker>()
            .map_err(|_| QuoteError::SymbolNotFound(symbol.to_string()))?;
        if from_ms > to_ms {
            return Err(QuoteError::Format(format!(
                "empty range {}..{}",
                from_ms, to_ms
            )));
        }
        let state = self
            .prices
            .get(&ticker)
            .ok_or_else(|| QuoteError::SymbolNotFound(symbol.to_string()))?;

        let step = interval.step_ms();
        let mut rng = StdRng::seed_from_u64(ticker.history_seed() ^ (to_ms / step) as u64);
        let mut close = state.previous_close;
        let mut points = Vec::new();
        let mut at = to_ms;
        while at >= from_ms && points.len() < MAX_HISTORY_POINTS {
            points.push(HistoryPoint {
                timestamp_ms: at,
                close: round_cents(close),
            });
            let change: f64 = rng.random_range(-0.04..0.04);
            close = (close / (1.0 + change)).max(0.01);
            match at.checked_sub(step) {
                Some(previous) => at = previous,
                None => break,
            }
        }
        Ok(points)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
