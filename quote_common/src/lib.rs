//!
//! Common types and utilities shared by the quote server, the sync engine and the
//! command-line front end.
//!
//! This crate aggregates:
//! - `error`: unified error type `QuoteError` used across the workspace.
//! - `result`: handy `Result<T, QuoteError>` alias.
//! - `symbol`: normalised ticker symbols and watch-list file parsing.
//! - `history`: price history points and the history blob codec.
//! - `quote`: remote quotes, persisted quote records and the display mode.
//! - `status`: the network status shown when the quote list is empty.
//! - `event`: change notifications published by the engine.
//! - `command`: JSON-line wire protocol of the quote server.
//! - `net` / `defaults`: networking and timing constants.
#![warn(missing_docs)]
pub mod command;
pub mod defaults;
pub mod error;
pub mod event;
pub mod history;
pub mod net;
pub mod quote;
pub mod result;
pub mod status;
pub mod symbol;

pub use error::QuoteError;
pub use event::SyncEvent;
pub use history::{HistoryInterval, HistoryPoint};
pub use quote::{DisplayMode, QuoteRecord, RemoteQuote};
pub use result::Result;
pub use status::NetworkStatus;
pub use symbol::Symbol;
