//! Domain models of the quote server.
//!
//! - `tickers`: the universe of known symbols.
//! - `market`: simulated prices, quotes and history series.
//! - `market_generator`: background thread moving prices.

pub mod market;
pub mod market_generator;
pub mod tickers;
