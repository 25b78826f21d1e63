//! Preference file of the quote watcher.
//!
//! Holds the watch list, the display mode and the last network status (as its integer
//! code). Every change is written through to disk, so a restart picks up where the last
//! run stopped. A missing file starts from a small default watch list.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use quote_common::{DisplayMode, NetworkStatus, Result, Symbol};
use quote_sync::{StatusCell, WatchList};
use serde::{Deserialize, Serialize};

use crate::json_file;

/// Watch list a fresh install starts with.
pub const DEFAULT_SYMBOLS: [&str; 4] = ["AAPL", "GOOGL", "MSFT", "META"];

/// On-disk layout of the preference file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Watched symbols.
    pub stocks: BTreeSet<Symbol>,
    /// Change column shown in the list.
    pub display_mode: DisplayMode,
    /// Last [`NetworkStatus`] code.
    pub network_status: i32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            stocks: DEFAULT_SYMBOLS
                .iter()
                .filter_map(|s| Symbol::parse(s).ok())
                .collect(),
            display_mode: DisplayMode::default(),
            network_status: NetworkStatus::default().code(),
        }
    }
}

/// Preferences backed by a JSON file.
#[derive(Debug)]
pub struct PreferenceFile {
    path: PathBuf,
    state: Mutex<Preferences>,
}

impl PreferenceFile {
    /// Load `path`, creating it with the defaults when it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match json_file::read::<Preferences>(&path)? {
            Some(state) => state,
            None => {
                debug!("No preference file at {}, seeding defaults", path.display());
                let state = Preferences::default();
                json_file::write(&path, &state)?;
                state
            }
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Stored display mode.
    pub fn display_mode(&self) -> DisplayMode {
        self.lock().display_mode
    }

    /// Store a new display mode.
    pub fn set_display_mode(&self, mode: DisplayMode) -> Result<()> {
        self.update(|prefs| {
            let changed = prefs.display_mode != mode;
            prefs.display_mode = mode;
            changed
        })
        .map(|_| ())
    }

    /// Switch to the other display mode and return it.
    pub fn toggle_display_mode(&self) -> Result<DisplayMode> {
        let mode = self.display_mode().toggled();
        self.set_display_mode(mode)?;
        Ok(mode)
    }

    fn lock(&self) -> MutexGuard<'_, Preferences> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and persist when it reports a modification. The in-memory state
    /// only moves forward once the file is written.
    fn update(&self, change: impl FnOnce(&mut Preferences) -> bool) -> Result<bool> {
        let mut state = self.lock();
        let mut next = state.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        json_file::write(&self.path, &next)?;
        *state = next;
        Ok(true)
    }
}

impl WatchList for PreferenceFile {
    fn symbols(&self) -> Result<BTreeSet<Symbol>> {
        Ok(self.lock().stocks.clone())
    }

    fn add(&self, symbol: Symbol) -> Result<bool> {
        self.update(|prefs| prefs.stocks.insert(symbol))
    }

    fn remove(&self, symbol: &Symbol) -> Result<bool> {
        self.update(|prefs| prefs.stocks.remove(symbol))
    }
}

impl StatusCell for PreferenceFile {
    fn get(&self) -> NetworkStatus {
        let code = self.lock().network_status;
        NetworkStatus::from_code(code).unwrap_or_else(|| {
            warn!("Unknown network status code {} in preferences", code);
            NetworkStatus::default()
        })
    }

    fn set(&self, status: NetworkStatus) {
        if let Err(e) = self.update(|prefs| {
            let changed = prefs.network_status != status.code();
            prefs.network_status = status.code();
            changed
        }) {
            warn!("Failed to store network status {}: {}", status, e);
        }
    }
}
