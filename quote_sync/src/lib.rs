//! Quote synchronization engine.
//!
//! Keeps a local table of quotes in step with a remote quote source for the symbols on
//! the user's watch list. The building blocks, leaves first:
//!
//! - `classifier`: decides per symbol whether a fetched quote is usable.
//! - `status`: the network status cell read by the presentation layer.
//! - `scheduler`: periodic trigger and exponential-backoff retry.
//! - `engine`: the orchestrator: single-flight sync cycles, persistence, events.
//!
//! Collaborators are traits (`provider`, `connectivity`, `watchlist`, `store`) with
//! in-memory implementations for tests; `tcp` talks to the bundled quote server.
#![warn(missing_docs)]
pub mod classifier;
pub mod config;
pub mod connectivity;
pub mod engine;
pub mod events;
pub mod provider;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod tcp;
pub mod watchlist;

pub use config::SyncConfig;
pub use engine::{EngineParts, FlightState, SyncEngine, SyncOutcome};
pub use provider::{QuoteProvider, QuoteSet};
pub use status::{MemoryStatus, StatusCell};
pub use store::{MemoryQuoteStore, QuoteBatch, QuoteStore};
pub use watchlist::{MemoryWatchList, WatchList};
