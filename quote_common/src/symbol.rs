//! Ticker symbols and helpers shared by the engine, the server and the front end.
//!
//! A `Symbol` is always stored trimmed and upper-cased, so `"aapl "` and `"AAPL"` name the
//! same watch-list entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::QuoteError;

/// Longest symbol accepted, exchange suffix included (e.g. `BRK-B.TO`).
pub const MAX_SYMBOL_LEN: usize = 12;

/// Trait providing file parsing for watch-list symbols.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, spaces or new lines. Blank entries are skipped
    /// and duplicates are kept only once, in order of first appearance.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Symbol>, QuoteError>;
}

/// Normalised ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validate and normalise `raw` into a symbol.
    pub fn parse(raw: &str) -> Result<Self, QuoteError> {
        let trimmed = raw.trim().trim_matches('"');
        if trimmed.is_empty() {
            return Err(QuoteError::Format("empty symbol".to_string()));
        }
        if trimmed.len() > MAX_SYMBOL_LEN {
            return Err(QuoteError::Format(format!("symbol too long: {}", trimmed)));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(QuoteError::Format(format!(
                "invalid character '{}' in symbol {}",
                bad, trimmed
            )));
        }
        Ok(Symbol(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = QuoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SymbolParser for Symbol {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, QuoteError> {
        let mut symbols: Vec<Symbol> = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(QuoteError::Io)?;
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.trim().is_empty() {
                    continue;
                }
                match token.parse::<Self>() {
                    Ok(symbol) if !symbols.contains(&symbol) => symbols.push(symbol),
                    Ok(_) => {}
                    Err(e) => return Err(QuoteError::ParseSymbolsFile(e.to_string())),
                }
            }
        }
        Ok(symbols)
    }
}
