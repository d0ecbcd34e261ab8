//! Registration and page update flow tests.
//!
//! Run with: `cargo test -p tether-tests --test registration_tests`

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tether_cache::MemoryCacheStorage;
use tether_core::events::{FetchStrategy, ResponseSource};
use tether_core::messages::ClientMessage;
use tether_core::ports::CacheStorage;
use tether_core::{CacheGeneration, Request, WorkerState};
use tether_tests::{INDEX_BODY, ScriptedNetwork, html, init_test_logging, shell_network};
use tether_worker::{ClientRegistry, PageStatus, Registration, ServiceWorker, WorkerConfig};

struct Scope {
    storage: Arc<MemoryCacheStorage>,
    network: Arc<ScriptedNetwork>,
    clients: Arc<ClientRegistry>,
    registration: Arc<Registration>,
}

impl Scope {
    fn new() -> Self {
        let network = Arc::new(shell_network());
        Self {
            storage: Arc::new(MemoryCacheStorage::new()),
            registration: Arc::new(Registration::new(network.clone())),
            network,
            clients: Arc::new(ClientRegistry::new()),
        }
    }

    fn worker(&self, config: WorkerConfig) -> Arc<ServiceWorker> {
        self.worker_on(config, self.network.clone())
    }

    fn worker_on(&self, config: WorkerConfig, network: Arc<ScriptedNetwork>) -> Arc<ServiceWorker> {
        Arc::new(ServiceWorker::new(
            config,
            self.storage.clone(),
            network,
            self.clients.clone(),
        ))
    }
}

fn v2_config() -> WorkerConfig {
    WorkerConfig::default()
        .with_cache_name(CacheGeneration::new("offline-demo-v2").unwrap())
        .with_skip_waiting(false)
}

fn page_request(path: &str) -> Request {
    Request::navigate(WorkerConfig::default().resolve(path).unwrap())
}

#[tokio::test]
async fn test_fetch_without_worker_goes_to_network() {
    init_test_logging();
    let scope = Scope::new();

    let outcome = scope.registration.fetch(page_request("/")).await.unwrap();
    assert_eq!(outcome.strategy, FetchStrategy::Passthrough);
    assert_eq!(outcome.source, ResponseSource::Network);
    assert!(scope.storage.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_worker_takes_control() {
    let scope = Scope::new();
    let worker = scope.worker(WorkerConfig::default());

    let state = scope.registration.update(worker.clone()).await.unwrap();
    assert_eq!(state, WorkerState::Activated);
    assert_eq!(scope.registration.active().await.unwrap().id(), worker.id());
    assert!(scope.registration.waiting().await.is_none());

    scope.network.set_online(false);
    let outcome = scope.registration.fetch(page_request("/")).await.unwrap();
    assert_eq!(outcome.source, ResponseSource::Cache);
}

#[tokio::test]
async fn test_failed_update_keeps_current_worker() {
    let scope = Scope::new();
    let v1 = scope.worker(WorkerConfig::default());
    scope.registration.update(v1.clone()).await.unwrap();

    // The new shell references a page the server does not have.
    let broken = Arc::new(ScriptedNetwork::new().with_route("/", html(INDEX_BODY)));
    let v2 = scope.worker_on(v2_config(), broken);

    assert!(scope.registration.update(v2.clone()).await.is_err());
    assert_eq!(v2.state(), WorkerState::Redundant);
    assert_eq!(v1.state(), WorkerState::Activated);
    assert_eq!(scope.registration.active().await.unwrap().id(), v1.id());
    assert!(scope.registration.waiting().await.is_none());
    assert_eq!(
        scope.storage.keys().await.unwrap(),
        vec![CacheGeneration::default()]
    );
}

#[tokio::test]
async fn test_waiting_worker_promoted_by_skip_waiting() {
    let scope = Scope::new();
    let v1 = scope.worker(WorkerConfig::default());
    scope.registration.update(v1.clone()).await.unwrap();

    let v2 = scope.worker(v2_config());
    assert_eq!(
        scope.registration.update(v2.clone()).await.unwrap(),
        WorkerState::Installed
    );
    assert_eq!(scope.registration.waiting().await.unwrap().id(), v2.id());
    assert_eq!(scope.registration.active().await.unwrap().id(), v1.id());

    let state = scope
        .registration
        .post_message(ClientMessage::SkipWaiting)
        .await
        .unwrap();
    assert_eq!(state, Some(WorkerState::Activated));
    assert_eq!(scope.registration.active().await.unwrap().id(), v2.id());
    assert!(scope.registration.waiting().await.is_none());
    assert_eq!(v1.state(), WorkerState::Redundant);
    assert_eq!(
        scope.storage.keys().await.unwrap(),
        vec![CacheGeneration::new("offline-demo-v2").unwrap()]
    );
}

#[tokio::test]
async fn test_newer_waiting_worker_replaces_stale_one() {
    let scope = Scope::new();
    scope
        .registration
        .update(scope.worker(WorkerConfig::default()))
        .await
        .unwrap();

    let stale = scope.worker(v2_config());
    scope.registration.update(stale.clone()).await.unwrap();
    let fresh = scope.worker(v2_config());
    scope.registration.update(fresh.clone()).await.unwrap();

    assert_eq!(stale.state(), WorkerState::Redundant);
    assert_eq!(scope.registration.waiting().await.unwrap().id(), fresh.id());
}

#[tokio::test]
async fn test_activation_retires_the_waiting_worker() {
    let scope = Scope::new();
    let v1 = scope.worker(WorkerConfig::default());
    scope.registration.update(v1.clone()).await.unwrap();

    let v2 = scope.worker(v2_config());
    scope.registration.update(v2.clone()).await.unwrap();
    assert_eq!(scope.registration.waiting().await.unwrap().id(), v2.id());

    let v3 = scope.worker(
        WorkerConfig::default().with_cache_name(CacheGeneration::new("offline-demo-v3").unwrap()),
    );
    assert_eq!(
        scope.registration.update(v3.clone()).await.unwrap(),
        WorkerState::Activated
    );
    assert_eq!(v1.state(), WorkerState::Redundant);
    assert_eq!(v2.state(), WorkerState::Redundant);
    assert!(scope.registration.waiting().await.is_none());
    assert_eq!(scope.registration.active().await.unwrap().id(), v3.id());

    // A late SKIP_WAITING cannot bring the older worker back.
    let state = scope
        .registration
        .post_message(ClientMessage::SkipWaiting)
        .await
        .unwrap();
    assert_eq!(state, Some(WorkerState::Activated));
    assert_eq!(scope.registration.active().await.unwrap().id(), v3.id());
    assert_eq!(
        scope.storage.keys().await.unwrap(),
        vec![CacheGeneration::new("offline-demo-v3").unwrap()]
    );
}

#[tokio::test]
async fn test_skip_waiting_without_workers() {
    let scope = Scope::new();
    let state = scope
        .registration
        .post_message(ClientMessage::SkipWaiting)
        .await
        .unwrap();
    assert_eq!(state, None);
}

#[tokio::test]
async fn test_page_sees_update_and_requests_it() {
    let scope = Scope::new();
    let page = Arc::new(PageStatus::new(scope.registration.clone(), true));
    scope
        .registration
        .update(scope.worker(WorkerConfig::default()))
        .await
        .unwrap();
    assert!(!page.update_available());

    let v2 = scope.worker(v2_config());
    let mut update = page.subscribe_update();
    let tracker = page.track(v2.subscribe());
    scope.registration.update(v2.clone()).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), update.wait_for(|available| *available))
        .await
        .expect("update banner shown")
        .unwrap();

    let state = page.request_update().await.unwrap();
    assert_eq!(state, Some(WorkerState::Activated));
    assert!(!page.update_available());

    tokio::time::timeout(Duration::from_secs(5), tracker)
        .await
        .expect("tracker finishes once activated")
        .unwrap();
    assert_eq!(scope.registration.active().await.unwrap().id(), v2.id());
}

#[tokio::test]
async fn test_page_connectivity_is_independent_of_worker() {
    let scope = Scope::new();
    let page = PageStatus::new(scope.registration.clone(), true);
    scope
        .registration
        .update(scope.worker(WorkerConfig::default()))
        .await
        .unwrap();

    scope.network.set_online(false);
    page.set_online(false);
    assert_eq!(page.status_text(), "Offline");

    let outcome = scope.registration.fetch(page_request("/")).await.unwrap();
    assert_eq!(outcome.source, ResponseSource::Cache);

    page.set_online(true);
    assert!(page.is_online());
}
