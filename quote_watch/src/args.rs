//! Command-line arguments for the quote watcher.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use quote_common::DisplayMode;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Quote server address (`host:port`).
    #[clap(long, default_value = "127.0.0.1:8080")]
    pub server: String,

    /// Preference file holding the watch list, display mode and last network status.
    #[clap(long, default_value = "quote_prefs.json")]
    pub prefs: String,

    /// JSON file holding the synced quotes.
    #[clap(long, default_value = "quotes.json")]
    pub store: String,

    /// Symbols to add to the watch list, e.g. `--add NFLX,ibm`.
    #[clap(long, value_delimiter = ',')]
    pub add: Vec<String>,

    /// Symbols to remove from the watch list.
    #[clap(long, value_delimiter = ',')]
    pub remove: Vec<String>,

    /// Path to a text file with symbols to add to the watch list.
    /// Symbols may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub symbols_file: Option<String>,

    /// Change column shown next to the price; stored as the new preference.
    #[clap(long, value_enum)]
    pub display_mode: Option<DisplayMode>,

    /// Switch between the absolute and the percent change column; stored as the new
    /// preference. Applied after `--display-mode`.
    #[clap(long)]
    pub toggle_display: bool,

    /// Seconds between two periodic syncs.
    #[clap(long)]
    pub period_secs: Option<u64>,

    /// Sync once, print the list and exit.
    #[clap(long)]
    pub once: bool,

    /// Behave as if there were no network connection.
    #[clap(long)]
    pub offline: bool,

    /// Address probed to decide whether the network is up. Without it the network is
    /// assumed up and an unreachable `--server` is reported as a server outage.
    #[clap(long)]
    pub probe: Option<String>,
}
