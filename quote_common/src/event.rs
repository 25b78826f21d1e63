//! Change notifications published by the sync engine.
use crate::symbol::Symbol;

/// Event delivered to every subscriber of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The quote store changed and should be re-read.
    DataUpdated,
    /// The symbol was rejected by the quote source and dropped from the watch list.
    InvalidSymbol(Symbol),
}
