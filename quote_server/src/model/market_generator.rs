//! Background thread that moves market prices.
//!
//! The generator ticks at a fixed interval and applies one random-walk step to every
//! ticker. Crossbeam `select!` multiplexes the ticker with the shutdown channel.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, select, tick};
use log::{debug, info};

use crate::model::market::Market;

/// Background market data generator.
pub struct MarketGenerator;

impl MarketGenerator {
    /// Start the generator thread. It stops when `shutdown_rx` yields or disconnects.
    pub fn start(
        market: Arc<Mutex<Market>>,
        interval: Duration,
        shutdown_rx: Receiver<()>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            info!(
                "Market generator started (Thread ID: {:?})",
                thread::current().id()
            );
            let ticker = tick(interval);
            loop {
                select! {
                    recv(shutdown_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        market.lock().unwrap_or_else(PoisonError::into_inner).step();
                        debug!("Market prices moved");
                    }
                }
            }
            info!("Market generator stopping...");
        })
    }
}
