//! Periodic and retry triggers for the sync engine.
//!
//! A `Scheduler` only decides *when* to poke the engine; what happens on a poke is up to
//! the [`TriggerSink`] it was given. The retry trigger keeps firing with exponentially
//! growing delays for as long as the sink answers [`TriggerOutcome::Deferred`].
//!
//! `ThreadScheduler` runs one timer thread per registered trigger and multiplexes the
//! timer with a stop channel through `crossbeam_channel::select!`.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, after, bounded, select, tick};
use log::{debug, info, warn};

/// Why the engine is being asked to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Explicit request from the presentation layer.
    Immediate,
    /// Periodic timer.
    Periodic,
    /// Offline retry; `attempt` starts at zero.
    Retry {
        /// Number of earlier deferred attempts.
        attempt: u32,
    },
}

/// Answer of a sink to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A sync was started or coalesced into one in flight.
    Accepted,
    /// Preconditions were not met (e.g. offline); nothing was started.
    Deferred,
}

/// Receiver of scheduler triggers.
pub trait TriggerSink: Send + Sync {
    /// Handle one trigger.
    fn fire(&self, trigger: SyncTrigger) -> TriggerOutcome;
}

/// Exponential backoff: `initial * 2^attempt`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay before the first attempt.
    pub initial: Duration,
    /// Ceiling for any delay.
    pub max: Duration,
}

impl Backoff {
    /// Doubling backoff starting at `initial`.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    /// Delay before attempt number `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

/// Deferred-work capability used by the engine.
pub trait Scheduler: Send + Sync {
    /// Fire [`SyncTrigger::Periodic`] into `sink` every `interval`, regardless of the
    /// outcome. Registering again with the same interval is a no-op and returns `false`;
    /// a different interval replaces the previous registration.
    fn schedule_periodic(&self, interval: Duration, sink: Arc<dyn TriggerSink>) -> bool;

    /// Fire [`SyncTrigger::Retry`] into `sink` after `backoff.delay(0)`, then keep
    /// retrying with growing delays while the sink defers. Replaces a pending retry.
    fn schedule_once(&self, backoff: Backoff, sink: Arc<dyn TriggerSink>);

    /// Drop the pending retry, if any.
    fn cancel_once(&self);

    /// Drop every trigger.
    fn cancel(&self);
}

struct PeriodicJob {
    interval: Duration,
    stop_tx: Sender<()>,
}

/// Timer-thread backed scheduler.
///
/// Cancelling drops the job's stop sender; the timer thread notices on its next
/// `select!` and exits without being joined, so a trigger may cancel itself.
#[derive(Default)]
pub struct ThreadScheduler {
    periodic: Mutex<Option<PeriodicJob>>,
    once: Mutex<Option<Sender<()>>>,
}

impl ThreadScheduler {
    /// Create a scheduler with no registered triggers.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a periodic trigger is registered.
    pub fn has_periodic(&self) -> bool {
        self.periodic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_periodic(&self, interval: Duration, sink: Arc<dyn TriggerSink>) -> bool {
        let mut periodic = self.periodic.lock().unwrap_or_else(PoisonError::into_inner);
        if periodic.as_ref().is_some_and(|job| job.interval == interval) {
            debug!("Periodic sync already scheduled every {:?}", interval);
            return false;
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let spawned = thread::Builder::new()
            .name("quote-sync-periodic".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            let outcome = sink.fire(SyncTrigger::Periodic);
                            debug!("Periodic trigger: {:?}", outcome);
                        }
                    }
                }
                debug!("Periodic trigger stopped");
            });
        if let Err(e) = spawned {
            warn!("Failed to start periodic trigger: {}", e);
            return false;
        }

        info!("Scheduling a periodic sync every {:?}", interval);
        *periodic = Some(PeriodicJob { interval, stop_tx });
        true
    }

    fn schedule_once(&self, backoff: Backoff, sink: Arc<dyn TriggerSink>) {
        let mut once = self.once.lock().unwrap_or_else(PoisonError::into_inner);

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let spawned = thread::Builder::new()
            .name("quote-sync-retry".to_string())
            .spawn(move || {
                let mut attempt = 0u32;
                loop {
                    let delay = backoff.delay(attempt);
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(after(delay)) -> _ => {
                            match sink.fire(SyncTrigger::Retry { attempt }) {
                                TriggerOutcome::Accepted => break,
                                TriggerOutcome::Deferred => {
                                    attempt = attempt.saturating_add(1);
                                    info!(
                                        "Retry deferred, next attempt in {:?}",
                                        backoff.delay(attempt)
                                    );
                                }
                            }
                        }
                    }
                }
                debug!("Retry trigger finished after {} deferral(s)", attempt);
            });
        match spawned {
            Ok(_) => {
                info!("Scheduling a one-off sync in {:?}", backoff.delay(0));
                *once = Some(stop_tx);
            }
            Err(e) => warn!("Failed to start retry trigger: {}", e),
        }
    }

    fn cancel_once(&self) {
        if self
            .once
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("Pending retry cancelled");
        }
    }

    fn cancel(&self) {
        self.cancel_once();
        if self
            .periodic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("Periodic sync cancelled");
        }
    }
}
