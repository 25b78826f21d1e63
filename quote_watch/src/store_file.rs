//! Quote store persisted as one JSON object keyed by symbol.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use quote_common::{QuoteRecord, Result, Symbol};
use quote_sync::{QuoteBatch, QuoteStore};

use crate::json_file;

/// [`QuoteStore`] writing the whole table to a JSON file on every change.
///
/// A batch is applied to a copy of the table, the copy is written to disk, and only then
/// does it replace the in-memory table. A failed write leaves both untouched.
#[derive(Debug)]
pub struct JsonQuoteStore {
    path: PathBuf,
    rows: Mutex<BTreeMap<Symbol, QuoteRecord>>,
}

impl JsonQuoteStore {
    /// Open the store at `path`; a missing file is an empty table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let rows = json_file::read(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Symbol, QuoteRecord>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QuoteStore for JsonQuoteStore {
    fn apply(&self, batch: QuoteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut rows = self.lock();
        let mut next = rows.clone();
        batch.apply_to(&mut next);
        json_file::write(&self.path, &next)?;
        debug!("Wrote {} quote row(s) to {}", next.len(), self.path.display());
        *rows = next;
        Ok(())
    }

    fn delete(&self, symbol: &Symbol) -> Result<bool> {
        let mut rows = self.lock();
        if !rows.contains_key(symbol) {
            return Ok(false);
        }
        let mut next = rows.clone();
        next.remove(symbol);
        json_file::write(&self.path, &next)?;
        *rows = next;
        Ok(true)
    }

    fn all(&self) -> Result<Vec<QuoteRecord>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn get(&self, symbol: &Symbol) -> Result<Option<QuoteRecord>> {
        Ok(self.lock().get(symbol).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(symbol: &str, price: f64) -> QuoteRecord {
        QuoteRecord {
            symbol: Symbol::parse(symbol).unwrap(),
            price,
            change: 1.0,
            change_percent: 0.5,
            history: "1700000000000, 189.25\n".to_string(),
        }
    }

    #[test]
    fn batches_persist_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quotes.json");
        {
            let store = JsonQuoteStore::open(&path).unwrap();
            store
                .apply(QuoteBatch {
                    upserts: vec![record("AAPL", 190.0), record("MSFT", 410.0)],
                    removals: vec![],
                })
                .unwrap();
            store
                .apply(QuoteBatch {
                    upserts: vec![record("AAPL", 191.0)],
                    removals: vec![Symbol::parse("MSFT").unwrap()],
                })
                .unwrap();
        }

        let store = JsonQuoteStore::open(&path).unwrap();
        assert_eq!(store.all().unwrap(), vec![record("AAPL", 191.0)]);
    }

    #[test]
    fn failed_write_keeps_previous_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("quotes.json");
        let store = JsonQuoteStore::open(&path).unwrap();

        let result = store.apply(QuoteBatch {
            upserts: vec![record("AAPL", 190.0)],
            removals: vec![],
        });

        assert!(result.is_err());
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn empty_batch_does_not_touch_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quotes.json");
        let store = JsonQuoteStore::open(&path).unwrap();

        store.apply(QuoteBatch::default()).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn delete_removes_only_existing_rows() {
        let tmp = TempDir::new().unwrap();
        let store = JsonQuoteStore::open(tmp.path().join("quotes.json")).unwrap();
        store
            .apply(QuoteBatch {
                upserts: vec![record("AAPL", 190.0)],
                removals: vec![],
            })
            .unwrap();

        let aapl = Symbol::parse("AAPL").unwrap();
        assert!(store.delete(&aapl).unwrap());
        assert!(!store.delete(&aapl).unwrap());
        assert!(store.get(&aapl).unwrap().is_none());
    }
}
