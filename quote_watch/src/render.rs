//! Text rendering of the watch list.
use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};
use quote_common::defaults::STALE_AFTER_DAYS;
use quote_common::{DisplayMode, NetworkStatus, QuoteRecord};

/// Render `records` as a table, or the status message when there is nothing to show.
pub fn quote_list(
    records: &[QuoteRecord],
    status: NetworkStatus,
    mode: DisplayMode,
    now: DateTime<Utc>,
) -> String {
    if records.is_empty() {
        return format!("{}\n", status.empty_list_message());
    }

    let max_age = Duration::days(STALE_AFTER_DAYS);
    let mut out = String::new();
    for record in records {
        let _ = write!(
            out,
            "{:<12} {:>12} {:>10}",
            record.symbol.as_str(),
            format!("${:.2}", record.price),
            mode.format_change(record)
        );
        if record.is_stale(now, max_age) {
            out.push_str("  (out of date)");
        }
        out.push('\n');
    }
    out
}

/// Warning shown when the engine drops a symbol the quote source does not know.
pub fn invalid_symbol(symbol: &str) -> String {
    format!("{} is not a valid stock symbol and was removed from the watch list", symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_common::history::{HistoryPoint, encode};
    use quote_common::Symbol;

    fn record(symbol: &str, change: f64, newest: DateTime<Utc>) -> QuoteRecord {
        QuoteRecord {
            symbol: Symbol::parse(symbol).unwrap(),
            price: 190.5,
            change,
            change_percent: change / 2.0,
            history: encode(&[HistoryPoint::new(newest, 190.5)]),
        }
    }

    #[test]
    fn empty_list_shows_the_status_message() {
        let text = quote_list(
            &[],
            NetworkStatus::NetworkDown,
            DisplayMode::Percentage,
            Utc::now(),
        );
        assert_eq!(text.trim_end(), NetworkStatus::NetworkDown.empty_list_message());
    }

    #[test]
    fn rows_follow_the_display_mode() {
        let now = Utc::now();
        let records = [record("AAPL", -1.0, now)];

        let absolute = quote_list(&records, NetworkStatus::Ok, DisplayMode::Absolute, now);
        assert!(absolute.starts_with("AAPL"));
        assert!(absolute.contains("$190.50"));
        assert!(absolute.contains("-$1.00"));

        let percent = quote_list(&records, NetworkStatus::Ok, DisplayMode::Percentage, now);
        assert!(percent.contains("-0.50%"));
    }

    #[test]
    fn old_history_is_flagged_out_of_date() {
        let now = Utc::now();
        let records = [
            record("AAPL", 1.0, now - Duration::days(30)),
            record("MSFT", 1.0, now - Duration::days(1)),
        ];
        let text = quote_list(&records, NetworkStatus::Ok, DisplayMode::Percentage, now);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("(out of date)"));
        assert!(!lines[1].contains("out of date"));
    }
}
