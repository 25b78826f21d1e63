//! Wire protocol between the quote server and its clients.
//!
//! Every message is a single line of JSON terminated by `\n`. A client writes one
//! `Request` per connection and reads back exactly one `Response`.
use std::io::{BufRead, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::history::{HistoryInterval, HistoryPoint};
use crate::quote::RemoteQuote;

/// Upper bound on a single protocol line, in bytes.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Request sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// Current quotes for every listed symbol.
    Quotes {
        /// Requested symbols.
        symbols: Vec<String>,
    },
    /// Closing prices of one symbol between two instants (epoch millis, inclusive).
    History {
        /// Requested symbol.
        symbol: String,
        /// Range start.
        from_ms: i64,
        /// Range end.
        to_ms: i64,
        /// Spacing between points.
        interval: HistoryInterval,
    },
}

/// Reply written by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Response {
    /// Quotes for the requested symbols the server knows; unknown ones are omitted.
    Quotes(Vec<RemoteQuote>),
    /// History series; ordering is up to the server.
    History(Vec<HistoryPoint>),
    /// The request could not be served.
    Error(String),
}

/// Serialize `message` and write it as one protocol line.
pub fn write_message<W: Write, T: Serialize>(
    writer: &mut W,
    message: &T,
) -> Result<(), QuoteError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

/// Read one protocol line from `reader` and deserialize it.
pub fn read_message<R: BufRead, T: for<'de> Deserialize<'de>>(
    reader: &mut R,
) -> Result<T, QuoteError> {
    let mut line = String::new();
    let size = reader
        .by_ref()
        .take(MAX_LINE_BYTES as u64)
        .read_line(&mut line)?;
    if size == 0 {
        return Err(QuoteError::Format(
            "connection closed before a message arrived".to_string(),
        ));
    }
    if !line.ends_with('\n') && size >= MAX_LINE_BYTES {
        return Err(QuoteError::Format(format!(
            "message exceeds {} bytes",
            MAX_LINE_BYTES
        )));
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
