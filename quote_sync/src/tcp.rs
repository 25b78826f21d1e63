//! `QuoteProvider` backed by the quote server's JSON-line protocol.
//!
//! Each call opens a fresh TCP connection, writes one [`Request`] and reads one
//! [`Response`]. Connection, read and write timeouts bound every call.
use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use quote_common::command::{Request, Response, read_message, write_message};
use quote_common::net::IO_TIMEOUT_SECS;
use quote_common::{HistoryInterval, HistoryPoint, QuoteError, Result, Symbol};

use crate::provider::{QuoteProvider, QuoteSet};

/// TCP client of the quote server.
#[derive(Debug, Clone)]
pub struct TcpQuoteProvider {
    addr: String,
    timeout: Duration,
}

impl TcpQuoteProvider {
    /// Client for the server at `addr` (`host:port`) with the default timeout.
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_timeout(addr, Duration::from_secs(IO_TIMEOUT_SECS))
    }

    /// Client with a custom connect/read/write timeout.
    pub fn with_timeout(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    fn connect(&self) -> Result<TcpStream> {
        let mut last_error = None;
        for addr in self.addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.map(QuoteError::Io).unwrap_or_else(|| {
            QuoteError::Format(format!("{} resolved to no address", self.addr))
        }))
    }

    fn exchange(&self, request: &Request) -> Result<Response> {
        let mut stream = self.connect()?;
        debug!("Sending {:?} to {}", request, self.addr);
        write_message(&mut stream, request)?;
        let mut reader = BufReader::new(stream);
        read_message(&mut reader)
    }
}

impl QuoteProvider for TcpQuoteProvider {
    fn name(&self) -> &str {
        &self.addr
    }

    fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<QuoteSet> {
        let request = Request::Quotes {
            symbols: symbols.iter().map(ToString::to_string).collect(),
        };
        match self.exchange(&request)? {
            Response::Quotes(quotes) => Ok(quotes
                .into_iter()
                .filter_map(|quote| match Symbol::parse(&quote.symbol) {
                    Ok(symbol) => Some((symbol, quote)),
                    Err(e) => {
                        debug!("Ignoring quote with bad symbol {:?}: {}", quote.symbol, e);
                        None
                    }
                })
                .collect()),
            Response::Error(message) => Err(QuoteError::Server(message)),
            other => Err(QuoteError::Server(format!("unexpected reply {:?}", other))),
        }
    }

    fn fetch_history(
        &self,
        symbol: &Symbol,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>> {
        let request = Request::History {
            symbol: symbol.to_string(),
            from_ms: from.timestamp_millis(),
            to_ms: to.timestamp_millis(),
            interval,
        };
        match self.exchange(&request)? {
            Response::History(points) => Ok(points),
            Response::Error(message) => Err(QuoteError::Server(message)),
            other => Err(QuoteError::Server(format!("unexpected reply {:?}", other))),
        }
    }
}
