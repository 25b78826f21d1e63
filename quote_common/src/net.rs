//! Shared networking constants and helpers.

/// TCP port the quote server listens on by default.
pub const QUOTE_PORT: u16 = 8080;

/// Read/write timeout applied to every quote-server connection, in seconds.
pub const IO_TIMEOUT_SECS: u64 = 10;

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
