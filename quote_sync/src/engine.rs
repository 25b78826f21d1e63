//! Quote sync orchestrator.
//!
//! `SyncEngine` decides when a sync cycle runs, runs it, and reports the result through
//! the status cell and the event bus. Internally it wires together:
//!
//! - a worker thread that executes cycles handed to it over a `crossbeam_channel`;
//! - a single-slot gate (`FlightState`) in front of the worker, so requests arriving
//!   while a cycle runs collapse into at most one follow-up cycle;
//! - a cycle lock held for the whole fetch/classify/persist sequence, which also
//!   serialises direct [`SyncEngine::run_sync`] calls and watch-list removals;
//! - an entry lock around "fetch now or schedule a retry" for `initialize`/`sync_now`.
//!
//! None of the trigger entry points return errors: every failure ends up as a
//! [`NetworkStatus`] value and a log line.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use quote_common::{NetworkStatus, QuoteError, Result, Symbol, SyncEvent};

use crate::classifier::{Classification, classify};
use crate::config::SyncConfig;
use crate::connectivity::Connectivity;
use crate::events::EventBus;
use crate::provider::QuoteProvider;
use crate::scheduler::{Scheduler, SyncTrigger, TriggerOutcome, TriggerSink};
use crate::status::StatusCell;
use crate::store::{QuoteBatch, QuoteStore};
use crate::watchlist::WatchList;

/// Collaborators the engine is built from.
pub struct EngineParts {
    /// Remote quote source.
    pub provider: Arc<dyn QuoteProvider>,
    /// The user's watch list.
    pub watch_list: Arc<dyn WatchList>,
    /// Quote table written by the engine.
    pub store: Arc<dyn QuoteStore>,
    /// Status cell read by the presentation layer.
    pub status: Arc<dyn StatusCell>,
    /// Reachability check done before each sync.
    pub connectivity: Arc<dyn Connectivity>,
    /// Periodic and retry triggers.
    pub scheduler: Arc<dyn Scheduler>,
}

/// Result of one sync cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The watch list is empty; nothing was fetched.
    NoSymbols,
    /// The quote source failed; nothing was written.
    ServerDown,
    /// The watch list or the quote store failed; status left untouched.
    StorageFailed,
    /// The batch was persisted.
    Synced {
        /// Rows written.
        updated: usize,
        /// Symbols dropped from the watch list.
        rejected: Vec<Symbol>,
    },
}

/// State of the single execution slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    /// No cycle running or queued.
    Idle,
    /// A cycle is queued or running.
    Running,
    /// A cycle is running and one more must follow it.
    RunPending,
}

enum WorkerCommand {
    Run(SyncTrigger),
    Shutdown,
}

#[derive(Default)]
struct EntryState {
    periodic_registered: bool,
}

struct Inner {
    config: SyncConfig,
    provider: Arc<dyn QuoteProvider>,
    watch_list: Arc<dyn WatchList>,
    store: Arc<dyn QuoteStore>,
    status: Arc<dyn StatusCell>,
    connectivity: Arc<dyn Connectivity>,
    scheduler: Arc<dyn Scheduler>,
    events: EventBus,
    entry: Mutex<EntryState>,
    flight: Mutex<FlightState>,
    cycle: Mutex<()>,
    worker_tx: Sender<WorkerCommand>,
}

/// Handle to a running sync engine. Dropping it shuts the engine down.
pub struct SyncEngine {
    inner: Arc<Inner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SyncEngine {
    /// Build the engine and start its worker thread. No sync runs until
    /// [`SyncEngine::initialize`] or [`SyncEngine::sync_now`] is called.
    pub fn start(parts: EngineParts, config: SyncConfig) -> Result<Self> {
        let (worker_tx, worker_rx) = unbounded::<WorkerCommand>();
        let inner = Arc::new(Inner {
            config,
            provider: parts.provider,
            watch_list: parts.watch_list,
            store: parts.store,
            status: parts.status,
            connectivity: parts.connectivity,
            scheduler: parts.scheduler,
            events: EventBus::default(),
            entry: Mutex::new(EntryState::default()),
            flight: Mutex::new(FlightState::Idle),
            cycle: Mutex::new(()),
            worker_tx,
        });

        let worker_inner = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name("quote-sync-worker".to_string())
            .spawn(move || worker_loop(worker_inner, worker_rx))?;
        info!("Quote sync engine started with provider {}", inner.provider.name());

        Ok(Self {
            inner,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Register the periodic trigger (once per engine) and request an immediate sync.
    pub fn initialize(&self) {
        let mut entry = lock(&self.inner.entry);
        if !entry.periodic_registered {
            self.inner
                .scheduler
                .schedule_periodic(self.inner.config.period, self.inner.sink());
            entry.periodic_registered = true;
        }
        self.inner.sync_now_entered();
    }

    /// Request a sync. When offline, records `NetworkDown` and schedules a backed-off
    /// retry instead. Never blocks on the cycle itself.
    pub fn sync_now(&self) {
        let _entry = lock(&self.inner.entry);
        self.inner.sync_now_entered();
    }

    /// Run one sync cycle on the calling thread, waiting for any cycle in flight.
    pub fn run_sync(&self) -> SyncOutcome {
        self.inner.run_sync()
    }

    /// Normalise `raw`, add it to the watch list and request a sync.
    pub fn add_symbol(&self, raw: &str) -> Result<Symbol> {
        let symbol = Symbol::parse(raw)?;
        if self.inner.watch_list.add(symbol.clone())? {
            info!("Added {} to the watch list", symbol);
        }
        self.sync_now();
        Ok(symbol)
    }

    /// Drop `symbol` from the watch list and the quote store.
    ///
    /// Returns `false` if the symbol was not watched. Waits for a cycle in flight.
    pub fn remove_symbol(&self, symbol: &Symbol) -> Result<bool> {
        let _cycle = lock(&self.inner.cycle);
        let removed = self.inner.watch_list.remove(symbol)?;
        self.inner.store.delete(symbol)?;
        if self.inner.watch_list.symbols()?.is_empty() {
            self.inner.status.set(NetworkStatus::NoSymbolsConfigured);
        }
        self.inner.events.publish(SyncEvent::DataUpdated);
        info!("Removed {} from the watch list", symbol);
        Ok(removed)
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Current network status.
    pub fn status(&self) -> NetworkStatus {
        self.inner.status.get()
    }

    /// Current state of the execution slot.
    pub fn flight_state(&self) -> FlightState {
        *lock(&self.inner.flight)
    }

    /// Cancel every trigger, let the running cycle finish and stop the worker.
    pub fn shutdown(&self) {
        let Some(worker) = lock(&self.worker).take() else {
            return;
        };
        self.inner.scheduler.cancel();
        if self.inner.worker_tx.send(WorkerCommand::Shutdown).is_err() {
            warn!("Sync worker already gone");
        }
        if worker.join().is_err() {
            error!("Sync worker panicked");
        }
        info!("Quote sync engine stopped");
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn sink(self: &Arc<Self>) -> Arc<dyn TriggerSink> {
        Arc::new(EngineSink {
            inner: Arc::downgrade(self),
        })
    }

    /// Body of `sync_now`; the caller holds the entry lock.
    fn sync_now_entered(self: &Arc<Self>) {
        if self.connectivity.is_connected() {
            self.scheduler.cancel_once();
            self.submit(SyncTrigger::Immediate);
        } else {
            warn!("No connectivity, scheduling a retry");
            self.status.set(NetworkStatus::NetworkDown);
            self.scheduler.schedule_once(self.config.backoff(), self.sink());
        }
    }

    /// Hand a cycle to the worker unless one is already running or queued.
    fn submit(&self, trigger: SyncTrigger) {
        let mut flight = lock(&self.flight);
        match *flight {
            FlightState::Idle => {
                *flight = FlightState::Running;
                if self.worker_tx.send(WorkerCommand::Run(trigger)).is_err() {
                    error!("Sync worker is gone, dropping {:?} request", trigger);
                    *flight = FlightState::Idle;
                }
            }
            FlightState::Running => {
                debug!("Sync in flight, queueing {:?} request", trigger);
                *flight = FlightState::RunPending;
            }
            FlightState::RunPending => {
                debug!("Sync already queued, coalescing {:?} request", trigger);
            }
        }
    }

    /// Called by the worker after a cycle. True if another cycle must run.
    fn finish_cycle(&self) -> bool {
        let mut flight = lock(&self.flight);
        if *flight == FlightState::RunPending {
            *flight = FlightState::Running;
            true
        } else {
            *flight = FlightState::Idle;
            false
        }
    }

    fn run_sync(&self) -> SyncOutcome {
        let _cycle = lock(&self.cycle);
        self.execute_cycle()
    }

    fn execute_cycle(&self) -> SyncOutcome {
        debug!("Running sync cycle");

        let symbols = match self.watch_list.symbols() {
            Ok(symbols) => symbols,
            Err(e) => {
                error!("Cannot read the watch list: {}", e);
                return SyncOutcome::StorageFailed;
            }
        };
        if symbols.is_empty() {
            info!("Watch list is empty, nothing to sync");
            self.status.set(NetworkStatus::NoSymbolsConfigured);
            return SyncOutcome::NoSymbols;
        }
        debug!("Syncing {} symbol(s)", symbols.len());

        let batch = match self.fetch_batch(&symbols) {
            Ok(batch) => batch,
            Err(e) => {
                error!("Error fetching stock quotes: {}", e);
                self.status.set(NetworkStatus::ServerDown);
                return SyncOutcome::ServerDown;
            }
        };

        for symbol in &batch.removals {
            match self.watch_list.remove(symbol) {
                Ok(_) => warn!("Dropping invalid symbol {}", symbol),
                Err(e) => error!("Failed to drop invalid symbol {}: {}", symbol, e),
            }
            self.events.publish(SyncEvent::InvalidSymbol(symbol.clone()));
        }

        let updated = batch.upserts.len();
        let rejected = batch.removals.clone();
        if let Err(e) = self.store.apply(batch) {
            error!("Failed to persist quotes: {}", e);
            return SyncOutcome::StorageFailed;
        }
        info!("Persisted {} quote(s), rejected {}", updated, rejected.len());

        self.events.publish(SyncEvent::DataUpdated);
        self.status.set(NetworkStatus::Ok);
        SyncOutcome::Synced { updated, rejected }
    }

    /// Fetch quotes and histories. Any transport error aborts the whole batch before
    /// the watch list or the store is touched.
    fn fetch_batch(&self, symbols: &BTreeSet<Symbol>) -> Result<QuoteBatch, QuoteError> {
        let requested: Vec<Symbol> = symbols.iter().cloned().collect();
        let results = self.provider.fetch_quotes(&requested)?;
        let (from, to) = self.config.history_window(Utc::now());

        let mut batch = QuoteBatch::default();
        for symbol in requested {
            match classify(&symbol, &results) {
                Classification::Invalid(reason) => {
                    debug!("{} classified invalid: {}", symbol, reason);
                    batch.removals.push(symbol);
                }
                Classification::Valid(figures) => {
                    let series = self.provider.fetch_history(
                        &symbol,
                        from,
                        to,
                        self.config.history_interval,
                    )?;
                    batch.upserts.push(figures.into_record(symbol, series));
                }
            }
        }
        Ok(batch)
    }
}

/// Trigger sink handed to the scheduler. Holds the engine weakly so pending timers do
/// not keep it alive.
struct EngineSink {
    inner: Weak<Inner>,
}

impl TriggerSink for EngineSink {
    fn fire(&self, trigger: SyncTrigger) -> TriggerOutcome {
        let Some(inner) = self.inner.upgrade() else {
            debug!("Engine gone, ignoring {:?}", trigger);
            return TriggerOutcome::Accepted;
        };

        match trigger {
            SyncTrigger::Immediate => {
                inner.submit(trigger);
                TriggerOutcome::Accepted
            }
            SyncTrigger::Periodic => {
                if !inner.connectivity.is_connected() {
                    debug!("Offline, skipping periodic sync");
                    return TriggerOutcome::Deferred;
                }
                inner.scheduler.cancel_once();
                inner.submit(trigger);
                TriggerOutcome::Accepted
            }
            SyncTrigger::Retry { attempt } => {
                if !inner.connectivity.is_connected() {
                    debug!("Still offline on retry attempt {}", attempt);
                    inner.status.set(NetworkStatus::NetworkDown);
                    return TriggerOutcome::Deferred;
                }
                inner.submit(trigger);
                TriggerOutcome::Accepted
            }
        }
    }
}

fn worker_loop(inner: Arc<Inner>, rx: Receiver<WorkerCommand>) {
    debug!("Sync worker running");
    while let Ok(command) = rx.recv() {
        match command {
            WorkerCommand::Run(trigger) => {
                debug!("Sync requested by {:?}", trigger);
                loop {
                    let outcome = inner.run_sync();
                    debug!("Sync cycle finished: {:?}", outcome);
                    if !inner.finish_cycle() {
                        break;
                    }
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
    debug!("Sync worker stopping");
}

