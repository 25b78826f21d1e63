//! Quote record storage used by the engine.
//!
//! A sync cycle hands the store one [`QuoteBatch`]; implementations must apply it
//! atomically, so readers see either the whole batch or none of it.
use std::collections::BTreeMap;
use std::sync::Mutex;

use quote_common::{QuoteRecord, Result, Symbol};

/// Changes produced by one sync cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBatch {
    /// Rows to insert or replace, keyed by their symbol.
    pub upserts: Vec<QuoteRecord>,
    /// Symbols whose rows must disappear.
    pub removals: Vec<Symbol>,
}

impl QuoteBatch {
    /// True when applying the batch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }

    /// Apply the batch to an ordered map of rows.
    pub fn apply_to(self, rows: &mut BTreeMap<Symbol, QuoteRecord>) {
        for symbol in &self.removals {
            rows.remove(symbol);
        }
        for record in self.upserts {
            rows.insert(record.symbol.clone(), record);
        }
    }
}

/// Table of quote rows, one per symbol.
pub trait QuoteStore: Send + Sync {
    /// Apply `batch` atomically.
    fn apply(&self, batch: QuoteBatch) -> Result<()>;

    /// Delete the row of `symbol`. Returns `false` if there was none.
    fn delete(&self, symbol: &Symbol) -> Result<bool>;

    /// All rows, ordered by symbol.
    fn all(&self) -> Result<Vec<QuoteRecord>>;

    /// Row of `symbol`, if any.
    fn get(&self, symbol: &Symbol) -> Result<Option<QuoteRecord>>;
}

/// Quote table kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryQuoteStore {
    rows: Mutex<BTreeMap<Symbol, QuoteRecord>>,
}

impl MemoryQuoteStore {
    /// Create a store pre-filled with `records`.
    pub fn with_records<I: IntoIterator<Item = QuoteRecord>>(records: I) -> Self {
        let rows = records
            .into_iter()
            .map(|record| (record.symbol.clone(), record))
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }
}

impl QuoteStore for MemoryQuoteStore {
    fn apply(&self, batch: QuoteBatch) -> Result<()> {
        let mut rows = self.rows.lock()?;
        batch.apply_to(&mut rows);
        Ok(())
    }

    fn delete(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.rows.lock()?.remove(symbol).is_some())
    }

    fn all(&self) -> Result<Vec<QuoteRecord>> {
        Ok(self.rows.lock()?.values().cloned().collect())
    }

    fn get(&self, symbol: &Symbol) -> Result<Option<QuoteRecord>> {
        Ok(self.rows.lock()?.get(symbol).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, price: f64) -> QuoteRecord {
        QuoteRecord {
            symbol: Symbol::parse(symbol).unwrap(),
            price,
            change: 0.0,
            change_percent: 0.0,
            history: String::new(),
        }
    }

    #[test]
    fn batch_replaces_by_symbol_and_removes() {
        let store = MemoryQuoteStore::with_records(vec![record("AAPL", 1.0), record("GONE", 2.0)]);
        store
            .apply(QuoteBatch {
                upserts: vec![record("AAPL", 5.0), record("MSFT", 7.0)],
                removals: vec![Symbol::parse("GONE").unwrap()],
            })
            .unwrap();

        let rows = store.all().unwrap();
        let summary: Vec<(&str, f64)> = rows.iter().map(|r| (r.symbol.as_str(), r.price)).collect();
        assert_eq!(summary, vec![("AAPL", 5.0), ("MSFT", 7.0)]);
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let store = MemoryQuoteStore::with_records(vec![record("AAPL", 1.0)]);
        let aapl = Symbol::parse("AAPL").unwrap();
        assert!(store.delete(&aapl).unwrap());
        assert!(!store.delete(&aapl).unwrap());
        assert!(store.get(&aapl).unwrap().is_none());
    }

    #[test]
    fn empty_batch_is_detected() {
        assert!(QuoteBatch::default().is_empty());
    }
}
