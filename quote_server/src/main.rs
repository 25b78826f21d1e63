//! Simulated quote server.
//!
//! This binary answers the JSON-line requests of the quote synchronization engine. It
//! wires together two building blocks:
//!
//! - `MarketGenerator`: moves the simulated prices of every known ticker on a timer.
//! - `QuoteReceiver`: accepts TCP connections and serves one request per connection:
//!   a batch of current quotes or the price history of one symbol.
//!
//! Unknown symbols are left out of quote batches and `--halted` tickers are reported
//! without a price, so clients can exercise their invalid-symbol handling.
//!
//! Shutdown: Ctrl+C sets a shared flag that stops the accept loop and closes the
//! generator's shutdown channel.
#![warn(missing_docs)]
use crate::args::Args;
use crate::model::market::Market;
use crate::model::market_generator::MarketGenerator;
use crate::model::tickers::Ticker;
use crate::receiver::QuoteReceiver;
use clap::Parser;
use crossbeam_channel::bounded;
use log::{info, warn};
use quote_common::QuoteError;
use quote_common::net::addr;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod args;
pub mod model;
mod receiver;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();

    let shutdown = Arc::new(AtomicBool::new(false));
    let (stop_tx, stop_rx) = bounded::<()>(1);
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down server...");
            shutdown.store(true, Ordering::SeqCst);
            let _ = stop_tx.try_send(());
        })
        .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let halted = parse_halted(&args.halted);
    let market = Arc::new(Mutex::new(Market::new(halted)));
    let generator = MarketGenerator::start(
        Arc::clone(&market),
        Duration::from_millis(args.tick_ms),
        stop_rx,
    );

    let receiver = QuoteReceiver::new(&addr(&args.bind, args.port))?;
    receiver.serve(market, shutdown)?;

    if generator.join().is_err() {
        warn!("Market generator panicked");
    }
    info!("Server stopped at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}

fn parse_halted(raw: &[String]) -> HashSet<Ticker> {
    raw.iter()
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| match s.trim().parse::<Ticker>() {
            Ok(ticker) => Some(ticker),
            Err(_) => {
                warn!("Ignoring unknown halted ticker: {}", s);
                None
            }
        })
        .collect()
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
