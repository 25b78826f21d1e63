//! Universe of symbols the quote server knows about.

use strum_macros::{Display, EnumIter, EnumString};

/// Symbols with simulated market data. Anything else is unknown to the server.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Display, EnumString, EnumIter, Hash, Eq, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum Ticker {
    AAPL,
    MSFT,
    GOOGL,
    AMZN,
    NVDA,
    META,
    TSLA,
    JPM,
    JNJ,
    V,
    PG,
    UNH,
    HD,
    DIS,
    PYPL,
    NFLX,
    ADBE,
    CRM,
    INTC,
    CSCO,
    PFE,
    KO,
    PEP,
    COST,
    ORCL,
    IBM,
    GS,
    MS,
    BA,
    CAT,
}

impl Ticker {
    /// Deterministic starting price in the `[20, 520)` range, so restarts look alike.
    pub fn base_price(self) -> f64 {
        let seed = self
            .to_string()
            .bytes()
            .fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        20.0 + (seed % 50_000) as f64 / 100.0
    }

    /// Seed for the simulated history of this ticker.
    pub fn history_seed(self) -> u64 {
        self.to_string()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
                (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("aapl".parse::<Ticker>().unwrap(), Ticker::AAPL);
        assert!("XXXX".parse::<Ticker>().is_err());
    }

    #[test]
    fn base_prices_are_positive_and_stable() {
        for ticker in Ticker::iter() {
            let price = ticker.base_price();
            assert!((20.0..520.0).contains(&price), "{ticker}: {price}");
            assert_eq!(price, ticker.base_price());
        }
    }
}
