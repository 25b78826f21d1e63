//! Watch-list access used by the engine.
use std::collections::BTreeSet;
use std::sync::Mutex;

use quote_common::{Result, Symbol};

/// The user's set of watched symbols, owned by the preference store.
pub trait WatchList: Send + Sync {
    /// Snapshot of the current symbols.
    fn symbols(&self) -> Result<BTreeSet<Symbol>>;

    /// Add `symbol`. Returns `false` if it was already watched.
    fn add(&self, symbol: Symbol) -> Result<bool>;

    /// Remove `symbol`. Returns `false` if it was not watched.
    fn remove(&self, symbol: &Symbol) -> Result<bool>;
}

/// Watch list kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryWatchList {
    symbols: Mutex<BTreeSet<Symbol>>,
}

impl MemoryWatchList {
    /// Create a list holding `symbols`.
    pub fn new<I: IntoIterator<Item = Symbol>>(symbols: I) -> Self {
        Self {
            symbols: Mutex::new(symbols.into_iter().collect()),
        }
    }
}

impl WatchList for MemoryWatchList {
    fn symbols(&self) -> Result<BTreeSet<Symbol>> {
        Ok(self.symbols.lock()?.clone())
    }

    fn add(&self, symbol: Symbol) -> Result<bool> {
        Ok(self.symbols.lock()?.insert(symbol))
    }

    fn remove(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.symbols.lock()?.remove(symbol))
    }
}
