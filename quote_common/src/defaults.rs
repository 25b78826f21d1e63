//! Default timing and lookback values for quote synchronization.

/// Interval between two periodic syncs, in seconds.
pub const SYNC_PERIOD_SECS: u64 = 300;

/// First delay of the offline retry, in seconds. Doubles on every failed attempt.
pub const INITIAL_BACKOFF_SECS: u64 = 10;

/// Ceiling for the offline retry delay, in seconds.
pub const MAX_BACKOFF_SECS: u64 = 300;

/// How far back the stored price history reaches, in years.
pub const YEARS_OF_HISTORY: u32 = 2;

/// Age after which the newest stored point makes a quote "out of date", in days.
pub const STALE_AFTER_DAYS: i64 = 7;
