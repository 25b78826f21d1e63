//! Connectivity checks used before starting a sync.
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;

/// Reports whether the network is currently usable.
pub trait Connectivity: Send + Sync {
    /// True when a sync has a chance to reach the quote source.
    fn is_connected(&self) -> bool;
}

/// Connectivity flag flipped by hand (tests, forced offline mode).
#[derive(Debug)]
pub struct ManualConnectivity {
    online: AtomicBool,
}

impl ManualConnectivity {
    /// Create a flag with the given initial state.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Change the reported state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for ManualConnectivity {
    fn is_connected(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Considers the network up when a TCP connection to `addr` can be opened.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Probe `addr` (`host:port`), giving up on each resolved address after `timeout`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

impl Connectivity for TcpProbe {
    fn is_connected(&self) -> bool {
        let addrs = match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("Cannot resolve {}: {}", self.addr, e);
                return false;
            }
        };
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => debug!("Probe to {} failed: {}", addr, e),
            }
        }
        false
    }
}
