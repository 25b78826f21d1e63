//! Engine configuration.
use std::time::Duration;

use chrono::{DateTime, Months, Utc};
use quote_common::HistoryInterval;
use quote_common::defaults::{
    INITIAL_BACKOFF_SECS, MAX_BACKOFF_SECS, SYNC_PERIOD_SECS, YEARS_OF_HISTORY,
};

use crate::scheduler::Backoff;

/// Tunables of the sync engine. `Default` gives the production values.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Interval of the periodic trigger.
    pub period: Duration,
    /// First delay of the offline retry.
    pub initial_backoff: Duration,
    /// Ceiling for the offline retry delay.
    pub max_backoff: Duration,
    /// Length of the stored history window, in years.
    pub years_of_history: u32,
    /// Granularity of the stored history.
    pub history_interval: HistoryInterval,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(SYNC_PERIOD_SECS),
            initial_backoff: Duration::from_secs(INITIAL_BACKOFF_SECS),
            max_backoff: Duration::from_secs(MAX_BACKOFF_SECS),
            years_of_history: YEARS_OF_HISTORY,
            history_interval: HistoryInterval::Weekly,
        }
    }
}

impl SyncConfig {
    /// Backoff policy of the offline retry.
    pub fn backoff(&self) -> Backoff {
        Backoff::exponential(self.initial_backoff, self.max_backoff)
    }

    /// History range ending at `now`.
    pub fn history_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = now
            .checked_sub_months(Months::new(self.years_of_history.saturating_mul(12)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        (from, now)
    }
}
