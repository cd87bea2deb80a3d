mod common;

use applianceflow_cloud::{
    Availability, CloudError, PowerConfig, PowerCycleController, PowerState, WaitConfig,
};
use common::FakeStore;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;

const ROUTER: &str = "113000000001";
const WINDOW: Duration = Duration::from_secs(30);

fn controller(store: &Arc<FakeStore>) -> PowerCycleController<FakeStore> {
    PowerCycleController::new(
        store.clone(),
        PowerConfig {
            poll: WaitConfig::new(Duration::from_secs(1), WINDOW),
            max_stop_attempts: 3,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_ensure_down_graceful() {
    let store = Arc::new(FakeStore::new(PowerState::Up));

    controller(&store).ensure_down(ROUTER, WINDOW).await.unwrap();

    assert_eq!(store.count("shutdown"), 1);
    assert_eq!(store.count("stop"), 0);
    assert_eq!(*store.power.lock().unwrap(), PowerState::Down);
}

#[tokio::test(start_paused = true)]
async fn test_ensure_down_when_already_down_is_noop() {
    let store = Arc::new(FakeStore::new(PowerState::Down));

    controller(&store).ensure_down(ROUTER, WINDOW).await.unwrap();

    assert!(store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_graceful_timeout_escalates_to_one_stop() {
    let store = Arc::new(FakeStore::new(PowerState::Up));
    store.ignore_shutdown.store(true, Ordering::SeqCst);

    let start = Instant::now();
    controller(&store).ensure_down(ROUTER, WINDOW).await.unwrap();

    assert_eq!(store.writes(), vec!["shutdown", "stop"]);
    assert_eq!(*store.power.lock().unwrap(), PowerState::Down);
    // one full graceful window elapsed before escalating
    assert!(start.elapsed() >= WINDOW);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_retried_up_to_limit() {
    let store = Arc::new(FakeStore::new(PowerState::Up));
    store.ignore_shutdown.store(true, Ordering::SeqCst);
    store.stops_to_ignore.store(2, Ordering::SeqCst);

    controller(&store).ensure_down(ROUTER, WINDOW).await.unwrap();

    assert_eq!(store.count("stop"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_stop_exhaustion_is_timeout() {
    let store = Arc::new(FakeStore::new(PowerState::Up));
    store.ignore_shutdown.store(true, Ordering::SeqCst);
    store.stops_to_ignore.store(10, Ordering::SeqCst);

    let err = controller(&store).ensure_down(ROUTER, WINDOW).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().contains("3 forced stop(s)"));
    // graceful window plus three stop windows
    match err.root() {
        CloudError::Timeout { waited, .. } => assert!(*waited >= WINDOW * 4, "{waited:?}"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(store.count("stop"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_boot_waits_until_up() {
    let store = Arc::new(FakeStore::new(PowerState::Down));

    controller(&store).boot(ROUTER, WINDOW).await.unwrap();

    assert_eq!(store.count("boot"), 1);
    assert_eq!(*store.power.lock().unwrap(), PowerState::Up);
}

#[tokio::test(start_paused = true)]
async fn test_power_cycle_gating_running() {
    let store = Arc::new(FakeStore::new(PowerState::Up));
    let controller = controller(&store);

    let value = controller
        .with_power_cycle(ROUTER, true, || async { Ok(42) })
        .await
        .unwrap();

    assert_eq!(value, 42);
    assert_eq!(store.count("shutdown") + store.count("stop"), 1);
    assert_eq!(store.count("boot"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_power_cycle_gating_stopped() {
    let store = Arc::new(FakeStore::new(PowerState::Down));

    controller(&store)
        .with_power_cycle(ROUTER, true, || async { Ok(()) })
        .await
        .unwrap();

    assert!(store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_power_cycle_skipped_when_not_required() {
    let store = Arc::new(FakeStore::new(PowerState::Up));

    controller(&store)
        .with_power_cycle(ROUTER, false, || async { Ok(()) })
        .await
        .unwrap();

    assert_eq!(store.count("power"), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_mutation_still_boots() {
    let store = Arc::new(FakeStore::new(PowerState::Up));

    let result: applianceflow_cloud::Result<()> = controller(&store)
        .with_power_cycle(ROUTER, true, || async {
            Err(applianceflow_cloud::CloudError::ApiError("400 Bad Request".into()))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(store.count("boot"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_available_polls_until_available() {
    let store = Arc::new(FakeStore::new(PowerState::Down));
    store.availability.lock().unwrap().extend([
        Availability::Migrating,
        Availability::Migrating,
        Availability::Available,
    ]);

    controller(&store).wait_available(ROUTER, WINDOW).await.unwrap();

    assert_eq!(store.count("read"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_wait_available_fails_fast_on_failed() {
    let store = Arc::new(FakeStore::new(PowerState::Down));
    store
        .availability
        .lock()
        .unwrap()
        .extend([Availability::Migrating, Availability::Failed]);

    let err = controller(&store).wait_available(ROUTER, WINDOW).await.unwrap_err();

    assert!(!err.is_timeout());
    assert!(err.to_string().contains("failed to provision"));
}
