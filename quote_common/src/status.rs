//! Network status reported by the sync engine.
//!
//! The presentation layer reads the last status to explain an empty quote list. The value
//! is persisted as a small integer preference, see [`NetworkStatus::code`].

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, FromRepr};

/// Outcome of the most recent sync attempt, as seen by the UI.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    FromRepr,
)]
#[repr(i32)]
#[strum(serialize_all = "snake_case")]
pub enum NetworkStatus {
    /// Last sync completed and the store holds the latest batch.
    #[default]
    Ok = 0,
    /// No connectivity when a sync was requested; a retry is scheduled.
    NetworkDown = 1,
    /// The quote source could not be reached or failed mid-request.
    ServerDown = 2,
    /// The watch list is empty, nothing was fetched.
    NoSymbolsConfigured = 3,
}

impl NetworkStatus {
    /// Integer form used by the preference store.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Inverse of [`NetworkStatus::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        Self::from_repr(code)
    }

    /// Text shown in place of the quote list when it is empty.
    pub fn empty_list_message(self) -> &'static str {
        match self {
            NetworkStatus::Ok => "No quotes to show yet.",
            NetworkStatus::NetworkDown => {
                "No network connection. Quotes will refresh once you are back online."
            }
            NetworkStatus::ServerDown => "The quote server is unavailable. Try again later.",
            NetworkStatus::NoSymbolsConfigured => {
                "Your watch list is empty. Add a symbol to get started."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for status in [
            NetworkStatus::Ok,
            NetworkStatus::NetworkDown,
            NetworkStatus::ServerDown,
            NetworkStatus::NoSymbolsConfigured,
        ] {
            assert_eq!(NetworkStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(NetworkStatus::from_code(42), None);
    }

    #[test]
    fn display_and_parse_use_snake_case() {
        assert_eq!(NetworkStatus::ServerDown.to_string(), "server_down");
        assert_eq!(
            "no_symbols_configured".parse::<NetworkStatus>().unwrap(),
            NetworkStatus::NoSymbolsConfigured
        );
    }

    #[test]
    fn default_is_ok() {
        assert_eq!(NetworkStatus::default(), NetworkStatus::Ok);
    }
}
