//! Install and activate integration tests.
//!
//! Run with: `cargo test -p tether-tests --test lifecycle_tests`

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tether_cache::MemoryCacheStorage;
use tether_core::events::FetchStrategy;
use tether_core::ports::{Cache, CacheStorage, Clients};
use tether_core::{CacheGeneration, Error, RequestKey, Response, WorkerState};
use tether_tests::{ScriptedNetwork, TestWorker, init_test_logging, shell_network};
use tether_worker::{ClientRegistry, WorkerConfig};

fn generation(name: &str) -> CacheGeneration {
    CacheGeneration::new(name).unwrap()
}

#[tokio::test]
async fn test_install_activates_by_default() {
    init_test_logging();
    let ctx = TestWorker::new(WorkerConfig::default());
    let mut states = ctx.worker.subscribe();

    let state = ctx.install().await.unwrap();
    assert_eq!(state, WorkerState::Activated);
    assert_eq!(*states.borrow_and_update(), WorkerState::Activated);
    assert_eq!(ctx.network.calls_for("/"), 1);
    assert_eq!(ctx.network.calls_for("/offline.html"), 1);
}

#[tokio::test]
async fn test_precache_failure_stores_nothing() {
    let ctx = TestWorker::new(WorkerConfig::default());
    ctx.network.set("/offline.html", Response::new(500, "down"));

    let err = ctx.install().await.unwrap_err();
    assert!(matches!(err, Error::PrecacheFailed { .. }));
    assert_eq!(ctx.worker.state(), WorkerState::Redundant);
    assert!(!ctx.storage.has(&ctx.config.cache_name).await.unwrap());
}

#[tokio::test]
async fn test_precache_unreachable_fails_install() {
    let ctx = TestWorker::new(WorkerConfig::default());
    ctx.network.set_online(false);

    let err = ctx.install().await.unwrap_err();
    assert!(matches!(err, Error::PrecacheFailed { .. }));
    assert!(ctx.storage.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_activate_evicts_every_other_generation() {
    let storage = Arc::new(MemoryCacheStorage::new());
    for name in ["offline-demo-v0", "legacy", "zz-unrelated"] {
        let cache = storage.open(&generation(name)).await.unwrap();
        cache
            .put(
                RequestKey::get("http://localhost:8080/".parse().unwrap()),
                Response::new(200, name),
            )
            .await
            .unwrap();
    }

    let ctx = TestWorker::with_parts(
        WorkerConfig::default(),
        storage,
        Arc::new(shell_network()),
        Arc::new(ClientRegistry::new()),
    );
    ctx.install().await.unwrap();

    assert_eq!(ctx.storage.keys().await.unwrap(), vec![ctx.config.cache_name.clone()]);
}

#[tokio::test]
async fn test_generation_bump_replaces_old_shell() {
    let v1 = TestWorker::activated().await;
    v1.navigate("/").await.unwrap();

    let v2 = TestWorker::with_parts(
        WorkerConfig::default().with_cache_name(generation("offline-demo-v2")),
        v1.storage.clone(),
        Arc::new(shell_network()),
        v1.clients.clone(),
    );
    assert_eq!(v2.install().await.unwrap(), WorkerState::Activated);

    assert_eq!(v2.storage.keys().await.unwrap(), vec![generation("offline-demo-v2")]);

    v2.network.set_online(false);
    let outcome = v2.navigate("/").await.unwrap();
    assert_eq!(outcome.response.text(), tether_tests::INDEX_BODY);
}

#[tokio::test]
async fn test_worker_waits_without_skip_waiting() {
    let ctx = TestWorker::new(WorkerConfig::default().with_skip_waiting(false));

    assert_eq!(ctx.install().await.unwrap(), WorkerState::Installed);

    let outcome = ctx.get("/app.css").await.unwrap();
    assert_eq!(outcome.strategy, FetchStrategy::Passthrough);

    assert_eq!(ctx.skip_waiting().await.unwrap(), WorkerState::Activated);
    let outcome = ctx.get("/app.css").await.unwrap();
    assert_eq!(outcome.strategy, FetchStrategy::CacheFirst);
}

#[tokio::test]
async fn test_skip_waiting_before_install_is_remembered() {
    let ctx = TestWorker::new(WorkerConfig::default().with_skip_waiting(false));

    assert_eq!(ctx.skip_waiting().await.unwrap(), WorkerState::Parsed);
    assert_eq!(ctx.install().await.unwrap(), WorkerState::Activated);
}

#[tokio::test]
async fn test_skip_waiting_on_active_worker_is_a_no_op() {
    let ctx = TestWorker::activated().await;
    assert_eq!(ctx.skip_waiting().await.unwrap(), WorkerState::Activated);
}

#[tokio::test]
async fn test_activate_twice_is_rejected() {
    let ctx = TestWorker::activated().await;

    let err = ctx.activate().await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            actual: WorkerState::Activated,
            ..
        }
    ));
}

#[tokio::test]
async fn test_install_twice_is_rejected() {
    let ctx = TestWorker::activated().await;
    assert!(ctx.install().await.is_err());
}

#[tokio::test]
async fn test_activation_claims_open_pages() {
    let clients = Arc::new(ClientRegistry::new());
    let (first, _rx1) = clients.connect().await;
    let (second, _rx2) = clients.connect().await;
    assert_eq!(clients.controlled().await, 0);

    let ctx = TestWorker::with_parts(
        WorkerConfig::default(),
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(
            ScriptedNetwork::new()
                .with_route("/", Response::new(200, "a"))
                .with_route("/offline.html", Response::new(200, "b")),
        ),
        clients.clone(),
    );
    ctx.install().await.unwrap();

    assert!(clients.is_controlled(first).await);
    assert!(clients.is_controlled(second).await);
    assert_eq!(clients.controlled().await, 2);
}

#[tokio::test]
async fn test_closed_pages_are_not_claimed() {
    let ctx = TestWorker::new(WorkerConfig::default());
    let (_open, _rx) = ctx.clients.connect().await;
    let (_closed, rx) = ctx.clients.connect().await;
    drop(rx);

    ctx.install().await.unwrap();
    assert_eq!(ctx.clients.controlled().await, 1);
}
