use log::{debug, error, info, warn};
use quote_common::QuoteError;
use quote_common::command::{Request, Response, read_message, write_message};
use quote_common::net::IO_TIMEOUT_SECS;
use std::io::{BufReader, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::model::market::Market;

/// Pause between two polls of the non-blocking listener.
const ACCEPT_POLL_MS: u64 = 50;

/// TCP request receiver of the quote server.
///
/// Accepts client connections and serves one `Request` per connection on its own
/// thread. A client sending garbage only loses its own connection.
pub struct QuoteReceiver {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl QuoteReceiver {
    /// Bind a new TCP receiver to the provided `bind_addr` (e.g., `0.0.0.0:8080`).
    pub fn new(bind_addr: &str) -> Result<Self, QuoteError> {
        let socket = TcpListener::bind(bind_addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket })
    }

    /// Address the receiver is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, QuoteError> {
        Ok(self.socket.local_addr()?)
    }

    /// Accept connections until `shutdown` is set.
    pub fn serve(
        self,
        market: Arc<Mutex<Market>>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<(), QuoteError> {
        info!("Quote TCP server is started on {}", self.local_addr()?);

        while !shutdown.load(Ordering::Relaxed) {
            match self.socket.accept() {
                Ok((stream, peer)) => {
                    debug!("Client connected: {}", peer);
                    let market = Arc::clone(&market);
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &market) {
                            warn!("Client {} failed: {}", peer, e);
                        }
                    });
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(ACCEPT_POLL_MS));
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        info!("Receiver loop stopping...");
        Ok(())
    }
}

/// Read one request from `stream`, answer it and close the connection.
fn handle_connection(stream: TcpStream, market: &Mutex<Market>) -> Result<(), QuoteError> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(IO_TIMEOUT_SECS)))?;
    stream.set_write_timeout(Some(Duration::from_secs(IO_TIMEOUT_SECS)))?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let response = match read_message::<_, Request>(&mut reader) {
        Ok(request) => {
            info!("Received request {:?}", request);
            let market = market.lock().unwrap_or_else(PoisonError::into_inner);
            respond(&market, request)
        }
        Err(e) => Response::Error(format!("bad request: {}", e)),
    };

    let mut writer = stream;
    write_message(&mut writer, &response)
}

/// Answer `request` from the current market state.
pub fn respond(market: &Market, request: Request) -> Response {
    match request {
        Request::Quotes { symbols } => Response::Quotes(market.quotes(&symbols)),
        Request::History {
            symbol,
            from_ms,
            to_ms,
            interval,
        } => match market.history(&symbol, from_ms, to_ms, interval) {
            Ok(points) => Response::History(points),
            Err(e) => Response::Error(e.to_string()),
        },
    }
}
