//! Command-line arguments for the quote server.
use clap::Parser;
use quote_common::net::QUOTE_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to bind the TCP listener to.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// TCP port to listen on.
    #[clap(long, default_value_t = QUOTE_PORT)]
    pub port: u16,

    /// Milliseconds between two simulated price moves.
    #[clap(long, default_value_t = 500)]
    pub tick_ms: u64,

    /// Tickers reported without a price, e.g. `--halted BA,CAT`.
    #[clap(long, value_delimiter = ',')]
    pub halted: Vec<String>,
}
