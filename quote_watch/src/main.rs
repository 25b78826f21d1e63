//! Quote Watch: a command-line front end of the quote synchronization engine.
//!
//! It keeps a watch list of ticker symbols in a preference file, syncs their quotes from
//! the quote server into a local JSON store and prints the list every time the engine
//! reports new data. An empty list is replaced by a message explaining the last network
//! status (offline, server down, nothing watched).
//!
//! Usage example (CLI):
//! ```bash
//! quote_watch --server 127.0.0.1:8080 --add NFLX,IBM --display-mode absolute
//! quote_watch --once --symbols-file ./symbols.txt
//! ```
//!
//! Without `--once` the watcher keeps running: the engine syncs on start, then every
//! `--period-secs`, and retries with a growing delay while the network is down. Ctrl+C
//! stops it.
#![warn(missing_docs)]
mod args;
mod json_file;
mod prefs;
mod render;
mod store_file;

use crate::args::Args;
use crate::prefs::PreferenceFile;
use crate::store_file::JsonQuoteStore;
use chrono::Utc;
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use log::{error, info, warn};
use quote_common::symbol::SymbolParser;
use quote_common::{NetworkStatus, QuoteError, Result, Symbol, SyncEvent};
use quote_sync::connectivity::{Connectivity, ManualConnectivity, TcpProbe};
use quote_sync::scheduler::ThreadScheduler;
use quote_sync::tcp::TcpQuoteProvider;
use quote_sync::{
    EngineParts, QuoteStore, StatusCell, SyncConfig, SyncEngine, SyncOutcome, WatchList,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// How long a connectivity probe may take.
const PROBE_TIMEOUT_MS: u64 = 2000;

/// How often the event loop checks for Ctrl+C.
const POLL_MS: u64 = 500;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down watcher...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let prefs = Arc::new(PreferenceFile::open(normalize_path(&args.prefs))?);
    let store = Arc::new(JsonQuoteStore::open(normalize_path(&args.store))?);
    if let Some(mode) = args.display_mode {
        prefs.set_display_mode(mode)?;
    }
    if args.toggle_display {
        let mode = prefs.toggle_display_mode()?;
        info!("Showing {} change", mode);
    }

    let connectivity = connectivity_for(args.offline, args.probe.as_deref());

    let mut config = SyncConfig::default();
    if let Some(secs) = args.period_secs {
        config.period = Duration::from_secs(secs.max(1));
    }

    let engine = SyncEngine::start(
        EngineParts {
            provider: Arc::new(TcpQuoteProvider::new(args.server.clone())),
            watch_list: prefs.clone(),
            store: store.clone(),
            status: prefs.clone(),
            connectivity: connectivity.clone(),
            scheduler: Arc::new(ThreadScheduler::new()),
        },
        config,
    )?;

    edit_watch_list(&args, &engine, prefs.as_ref(), connectivity.as_ref())?;

    if args.once {
        if connectivity.is_connected() {
            let outcome = engine.run_sync();
            info!("Sync finished: {:?}", outcome);
            if let SyncOutcome::Synced { rejected, .. } = &outcome {
                for symbol in rejected {
                    println!("{}", render::invalid_symbol(symbol.as_str()));
                }
            }
        } else {
            warn!("No connectivity, showing stored quotes");
            StatusCell::set(prefs.as_ref(), NetworkStatus::NetworkDown);
        }
        print_list(prefs.as_ref(), store.as_ref());
        return Ok(());
    }

    let events = engine.subscribe();
    print_list(prefs.as_ref(), store.as_ref());
    engine.initialize();
    info!("Watcher is running. Press Ctrl+C to exit.");

    while !shutdown.load(Ordering::Relaxed) {
        match events.recv_timeout(Duration::from_millis(POLL_MS)) {
            Ok(SyncEvent::DataUpdated) => print_list(prefs.as_ref(), store.as_ref()),
            Ok(SyncEvent::InvalidSymbol(symbol)) => {
                println!("{}", render::invalid_symbol(symbol.as_str()));
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Engine event stream closed");
                break;
            }
        }
    }

    engine.shutdown();
    Ok(())
}

/// Pick the reachability check. Without `--probe` the network is assumed up, so an
/// unreachable quote server is reported as a server outage rather than as being offline.
fn connectivity_for(offline: bool, probe: Option<&str>) -> Arc<dyn Connectivity> {
    match (offline, probe) {
        (true, _) => Arc::new(ManualConnectivity::new(false)),
        (false, Some(addr)) => Arc::new(TcpProbe::new(
            addr,
            Duration::from_millis(PROBE_TIMEOUT_MS),
        )),
        (false, None) => Arc::new(ManualConnectivity::new(true)),
    }
}

/// Apply `--symbols-file`, `--add` and `--remove` before the first sync.
fn edit_watch_list(
    args: &Args,
    engine: &SyncEngine,
    watch_list: &dyn WatchList,
    connectivity: &dyn Connectivity,
) -> Result<(), QuoteError> {
    let mut added = Vec::new();
    if let Some(path) = &args.symbols_file {
        let file = File::open(normalize_path(path))?;
        added.extend(Symbol::parse_from_file(BufReader::new(file))?);
    }
    for raw in &args.add {
        match Symbol::parse(raw) {
            Ok(symbol) => added.push(symbol),
            Err(e) => error!("Skipping {}: {}", raw, e),
        }
    }

    let online = added.is_empty() || connectivity.is_connected();
    for symbol in added {
        if watch_list.add(symbol.clone())? {
            if online {
                info!("Added {}", symbol);
            } else {
                println!("{} added; it will be refreshed once you are back online", symbol);
            }
        }
    }

    for raw in &args.remove {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(e) => {
                error!("Skipping {}: {}", raw, e);
                continue;
            }
        };
        if !engine.remove_symbol(&symbol)? {
            warn!("{} was not on the watch list", symbol);
        }
    }
    Ok(())
}

fn print_list(prefs: &PreferenceFile, store: &dyn QuoteStore) {
    match store.all() {
        Ok(records) => print!(
            "{}",
            render::quote_list(
                &records,
                StatusCell::get(prefs),
                prefs.display_mode(),
                Utc::now(),
            )
        ),
        Err(e) => error!("Cannot read stored quotes: {}", e),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn without_probe_the_network_counts_as_up() {
        assert!(connectivity_for(false, None).is_connected());
    }

    #[test]
    fn offline_flag_wins_over_probe() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        assert!(!connectivity_for(true, Some(&addr)).is_connected());
        assert!(connectivity_for(false, Some(&addr)).is_connected());
    }

    #[test]
    fn normalize_path_strips_matching_quotes() {
        assert_eq!(normalize_path(" \"a b.json\" "), PathBuf::from("a b.json"));
        assert_eq!(normalize_path("\"open.json"), PathBuf::from("\"open.json"));
    }
}
