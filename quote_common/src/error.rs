//! Error types shared across the workspace.
//!
//! The `QuoteError` enum unifies the failure cases of the quote server, the sync engine
//! and the command-line front end: I/O, serialization, history decoding, poisoned locks
//! and remote-server failures.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Error while parsing a symbols file into `Symbol` values.
    #[error("Parse symbols file error: {0}")]
    ParseSymbolsFile(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A stored history blob could not be decoded.
    #[error("Malformed history line {line}: {reason}")]
    History {
        /// 1-based line number inside the blob.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The history blob is the reserved invalid-symbol marker and holds no points.
    #[error("History blob is the invalid-symbol marker")]
    InvalidHistoryMarker,

    /// The remote quote source answered with an error or an unexpected reply.
    #[error("Quote server error: {0}")]
    Server(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// A requested symbol is not known to the quote source.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
}

impl<T> From<PoisonError<T>> for QuoteError {
    fn from(err: PoisonError<T>) -> Self {
        QuoteError::MutexLock(err.to_string())
    }
}
