//! Scripted collaborators shared by the engine integration tests.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, bounded};
use quote_common::{
    HistoryInterval, HistoryPoint, QuoteError, RemoteQuote, Result, Symbol, SyncEvent,
};
use quote_sync::connectivity::ManualConnectivity;
use quote_sync::scheduler::{Backoff, Scheduler, SyncTrigger, TriggerOutcome, TriggerSink};
use quote_sync::{
    EngineParts, MemoryQuoteStore, MemoryStatus, MemoryWatchList, QuoteBatch, QuoteProvider,
    QuoteSet, QuoteStore, SyncConfig, SyncEngine, WatchList,
};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn sym(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

/// Poll `condition` until it holds or `WAIT` runs out.
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + WAIT;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub fn quote(symbol: &str, price: Option<f64>) -> RemoteQuote {
    RemoteQuote {
        symbol: symbol.to_string(),
        price,
        change: Some(2.5),
        change_percent: Some(1.3),
    }
}

pub fn weekly_series() -> Vec<HistoryPoint> {
    // Newest first, the way most quote sources return it.
    vec![
        HistoryPoint {
            timestamp_ms: 1_700_604_800_000,
            close: 191.5,
        },
        HistoryPoint {
            timestamp_ms: 1_700_000_000_000,
            close: 189.25,
        },
    ]
}

/// Provider answering from a fixed table, with optional failures and a blocking gate.
#[derive(Default)]
pub struct ScriptedProvider {
    quotes: Mutex<HashMap<Symbol, RemoteQuote>>,
    pub fail_quotes: AtomicBool,
    pub fail_history: AtomicBool,
    pub quote_calls: AtomicUsize,
    pub history_calls: Mutex<Vec<Symbol>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
}

impl ScriptedProvider {
    pub fn with_quotes(quotes: Vec<RemoteQuote>) -> Self {
        let provider = Self::default();
        provider.set_quotes(quotes);
        provider
    }

    /// Make every batch fetch announce itself on the returned `entered` receiver and
    /// wait for a message on `release` before answering.
    pub fn gated(self) -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = bounded(16);
        let (release_tx, release_rx) = bounded(16);
        *self.gate.lock().unwrap() = Some((entered_tx, release_rx));
        (self, entered_rx, release_tx)
    }

    pub fn set_quotes(&self, quotes: Vec<RemoteQuote>) {
        *self.quotes.lock().unwrap() = quotes.into_iter().map(|q| (sym(&q.symbol), q)).collect();
    }

    pub fn calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<QuoteSet> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.quote_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some((entered, release)) = gate {
            entered.send(()).unwrap();
            release.recv_timeout(WAIT).unwrap();
        }

        let result = if self.fail_quotes.load(Ordering::SeqCst) {
            Err(QuoteError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "server unreachable",
            )))
        } else {
            let table = self.quotes.lock().unwrap();
            Ok(symbols
                .iter()
                .filter_map(|s| table.get(s).map(|q| (s.clone(), q.clone())))
                .collect())
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn fetch_history(
        &self,
        symbol: &Symbol,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        interval: HistoryInterval,
    ) -> Result<Vec<HistoryPoint>> {
        assert_eq!(interval, HistoryInterval::Weekly);
        self.history_calls.lock().unwrap().push(symbol.clone());
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(QuoteError::Server("history timed out".to_string()));
        }
        Ok(weekly_series())
    }
}

/// Scheduler that records registrations and lets the test fire triggers by hand.
#[derive(Default)]
pub struct RecordingScheduler {
    pub periodic: Mutex<Vec<Duration>>,
    pub once: Mutex<Vec<Backoff>>,
    pub cancelled_once: AtomicUsize,
    sink: Mutex<Option<Arc<dyn TriggerSink>>>,
}

impl RecordingScheduler {
    pub fn fire(&self, trigger: SyncTrigger) -> TriggerOutcome {
        let sink = self.sink.lock().unwrap().clone().expect("no trigger registered");
        sink.fire(trigger)
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule_periodic(&self, interval: Duration, sink: Arc<dyn TriggerSink>) -> bool {
        self.periodic.lock().unwrap().push(interval);
        *self.sink.lock().unwrap() = Some(sink);
        true
    }

    fn schedule_once(&self, backoff: Backoff, sink: Arc<dyn TriggerSink>) {
        self.once.lock().unwrap().push(backoff);
        *self.sink.lock().unwrap() = Some(sink);
    }

    fn cancel_once(&self) {
        self.cancelled_once.fetch_add(1, Ordering::SeqCst);
    }

    fn cancel(&self) {}
}

/// Store that remembers whether a "data updated" event was already published when a
/// batch was written. `events` must be a subscription of its own. Setting `fail_apply`
/// makes every batch write fail.
#[derive(Default)]
pub struct OrderCheckingStore {
    pub rows: MemoryQuoteStore,
    pub events: Mutex<Option<Receiver<SyncEvent>>>,
    pub event_before_write: AtomicBool,
    pub writes: AtomicUsize,
    pub fail_apply: AtomicBool,
}

impl QuoteStore for OrderCheckingStore {
    fn apply(&self, batch: QuoteBatch) -> Result<()> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(QuoteError::Io(std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "disk full",
            )));
        }
        if let Some(rx) = self.events.lock().unwrap().as_ref() {
            if rx.try_iter().any(|event| event == SyncEvent::DataUpdated) {
                self.event_before_write.store(true, Ordering::SeqCst);
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.rows.apply(batch)
    }

    fn delete(&self, symbol: &Symbol) -> Result<bool> {
        self.rows.delete(symbol)
    }

    fn all(&self) -> Result<Vec<quote_common::QuoteRecord>> {
        self.rows.all()
    }

    fn get(&self, symbol: &Symbol) -> Result<Option<quote_common::QuoteRecord>> {
        self.rows.get(symbol)
    }
}

/// Watch list whose every read fails.
pub struct BrokenWatchList;

impl WatchList for BrokenWatchList {
    fn symbols(&self) -> Result<BTreeSet<Symbol>> {
        Err(QuoteError::MutexLock("watch list unavailable".to_string()))
    }

    fn add(&self, _symbol: Symbol) -> Result<bool> {
        Err(QuoteError::MutexLock("watch list unavailable".to_string()))
    }

    fn remove(&self, _symbol: &Symbol) -> Result<bool> {
        Err(QuoteError::MutexLock("watch list unavailable".to_string()))
    }
}

pub struct Harness {
    pub engine: SyncEngine,
    pub provider: Arc<ScriptedProvider>,
    pub watch_list: Arc<MemoryWatchList>,
    pub store: Arc<OrderCheckingStore>,
    pub status: Arc<MemoryStatus>,
    pub connectivity: Arc<ManualConnectivity>,
    pub scheduler: Arc<RecordingScheduler>,
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn harness(provider: ScriptedProvider, watched: &[&str]) -> Harness {
    init_logger();
    let provider = Arc::new(provider);
    let watch_list = Arc::new(MemoryWatchList::new(watched.iter().map(|s| sym(s))));
    let store = Arc::new(OrderCheckingStore::default());
    let status = Arc::new(MemoryStatus::default());
    let connectivity = Arc::new(ManualConnectivity::new(true));
    let scheduler = Arc::new(RecordingScheduler::default());

    let engine = SyncEngine::start(
        EngineParts {
            provider: provider.clone(),
            watch_list: watch_list.clone(),
            store: store.clone(),
            status: status.clone(),
            connectivity: connectivity.clone(),
            scheduler: scheduler.clone(),
        },
        SyncConfig::default(),
    )
    .unwrap();
    *store.events.lock().unwrap() = Some(engine.subscribe());

    Harness {
        engine,
        provider,
        watch_list,
        store,
        status,
        connectivity,
        scheduler,
    }
}
