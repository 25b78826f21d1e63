mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedProvider, WAIT, init_logger, quote, sym, wait_until};
use quote_common::{NetworkStatus, SyncEvent};
use quote_sync::connectivity::ManualConnectivity;
use quote_sync::scheduler::ThreadScheduler;
use quote_sync::tcp::TcpQuoteProvider;
use quote_sync::{
    EngineParts, MemoryQuoteStore, MemoryStatus, MemoryWatchList, SyncConfig, SyncEngine,
};

fn engine(
    online: bool,
    period: Duration,
) -> (SyncEngine, Arc<ManualConnectivity>, Arc<ScriptedProvider>) {
    init_logger();
    let provider = Arc::new(ScriptedProvider::with_quotes(vec![quote("AAPL", Some(190.0))]));
    let connectivity = Arc::new(ManualConnectivity::new(online));
    let config = SyncConfig {
        period,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(40),
        ..SyncConfig::default()
    };
    let engine = SyncEngine::start(
        EngineParts {
            provider: provider.clone(),
            watch_list: Arc::new(MemoryWatchList::new([sym("AAPL")])),
            store: Arc::new(MemoryQuoteStore::default()),
            status: Arc::new(MemoryStatus::default()),
            connectivity: connectivity.clone(),
            scheduler: Arc::new(ThreadScheduler::new()),
        },
        config,
    )
    .unwrap();
    (engine, connectivity, provider)
}

#[test]
fn periodic_trigger_keeps_syncing_until_shutdown() {
    let (engine, _connectivity, provider) = engine(true, Duration::from_millis(30));
    let events = engine.subscribe();

    engine.initialize();
    for _ in 0..3 {
        assert_eq!(events.recv_timeout(WAIT).unwrap(), SyncEvent::DataUpdated);
    }

    engine.shutdown();
    let calls = provider.calls();
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(provider.calls(), calls);
}

#[test]
fn offline_start_recovers_through_the_retry() {
    let (engine, connectivity, provider) = engine(false, Duration::from_secs(3600));
    let events = engine.subscribe();

    engine.initialize();
    assert_eq!(engine.status(), NetworkStatus::NetworkDown);
    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(provider.calls(), 0);

    connectivity.set_online(true);
    assert_eq!(events.recv_timeout(WAIT).unwrap(), SyncEvent::DataUpdated);
    assert!(wait_until(|| engine.status() == NetworkStatus::Ok));
    assert_eq!(provider.calls(), 1);
}

#[test]
fn unreachable_quote_server_reports_server_down() {
    init_logger();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let engine = SyncEngine::start(
        EngineParts {
            provider: Arc::new(TcpQuoteProvider::with_timeout(
                addr,
                Duration::from_millis(200),
            )),
            watch_list: Arc::new(MemoryWatchList::new([sym("AAPL")])),
            store: Arc::new(MemoryQuoteStore::default()),
            status: Arc::new(MemoryStatus::default()),
            connectivity: Arc::new(ManualConnectivity::new(true)),
            scheduler: Arc::new(ThreadScheduler::new()),
        },
        SyncConfig::default(),
    )
    .unwrap();
    let events = engine.subscribe();

    engine.sync_now();

    assert!(wait_until(|| engine.status() == NetworkStatus::ServerDown));
    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
}
