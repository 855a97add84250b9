//! Integration tests for the offline cache worker driven through its handle:
//! install on first start, cache fallback when the network drops, and old
//! cache stores removed when a new version activates.
//!
//! Each test opens its own in-memory SQLite database. The network is a stub
//! so the whole app shell (including the pinned third-party stylesheets)
//! installs without leaving the process.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

use retroflix::content::{load_bundle, LoadError};
use retroflix::net::{Fetch, FetchError, Response};
use retroflix::storage::Database;
use retroflix::worker::{spawn, CacheWorker, WorkerConfig, WorkerHandle, WorkerState, APP_SHELL};

const BASE: &str = "http://partners.test/";

/// Serves a body derived from the URL. Icons get raw binary bodies so
/// byte-exact replay from the cache is observable.
#[derive(Default)]
struct StubNetwork {
    offline: AtomicBool,
    requests: AtomicUsize,
}

impl StubNetwork {
    fn body_for(url: &Url) -> Vec<u8> {
        if url.path().ends_with(".png") {
            (0..=255u8).rev().chain(0..=255u8).collect()
        } else {
            format!("body of {}", url).into_bytes()
        }
    }
}

#[async_trait]
impl Fetch for StubNetwork {
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Offline);
        }
        Ok(Response {
            url: url.clone(),
            status: 200,
            content_type: Some("application/octet-stream".to_string()),
            body: Self::body_for(url),
            from_cache: false,
        })
    }
}

fn base() -> Url {
    Url::parse(BASE).unwrap()
}

fn start(db: &Database, network: &Arc<StubNetwork>, cache_name: &str) -> WorkerHandle {
    spawn(CacheWorker::new(
        db.clone(),
        network.clone(),
        WorkerConfig {
            cache_name: cache_name.to_string(),
            base_url: base(),
            runtime_caching: false,
        },
    ))
}

// ============================================================================
// Install & Fallback
// ============================================================================

#[tokio::test]
async fn test_first_start_installs_and_activates() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());
    let handle = start(&db, &network, "retroflix-v1");

    assert_eq!(handle.wait_until_settled().await, WorkerState::Activated);

    let status = handle.status().await.unwrap();
    assert_eq!(status.cache_name, "retroflix-v1");
    assert_eq!(status.entries, APP_SHELL.len() as i64);
    assert_eq!(status.stores, vec!["retroflix-v1".to_string()]);
    assert_eq!(network.requests.load(Ordering::SeqCst), APP_SHELL.len());
}

#[tokio::test]
async fn test_offline_serves_cached_shell_byte_for_byte() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());
    let handle = start(&db, &network, "retroflix-v1");
    handle.wait_until_settled().await;

    network.offline.store(true, Ordering::SeqCst);

    let icon = base().join("icons/icon-192x192.png").unwrap();
    let response = handle.fetch(&icon).await.unwrap();
    assert!(response.from_cache);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, StubNetwork::body_for(&icon));

    let root = handle.fetch(&base()).await.unwrap();
    assert!(root.from_cache);
    assert_eq!(root.body, StubNetwork::body_for(&base()));
}

#[tokio::test]
async fn test_online_requests_go_to_network() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());
    let handle = start(&db, &network, "retroflix-v1");
    handle.wait_until_settled().await;

    let script = base().join("script.js").unwrap();
    let response = handle.fetch(&script).await.unwrap();

    assert!(!response.from_cache);
    assert_eq!(network.requests.load(Ordering::SeqCst), APP_SHELL.len() + 1);
}

#[tokio::test]
async fn test_offline_uncached_request_fails() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());
    let handle = start(&db, &network, "retroflix-v1");
    handle.wait_until_settled().await;

    network.offline.store(true, Ordering::SeqCst);

    let err = handle
        .fetch(&base().join("tv.json").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotCached { .. }));
}

#[tokio::test]
async fn test_content_bundle_is_fatal_offline() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());
    let handle = start(&db, &network, "retroflix-v1");
    handle.wait_until_settled().await;

    network.offline.store(true, Ordering::SeqCst);

    // content.json is not part of the shell, so nothing can stand in for it
    let result = load_bundle(&handle, &base()).await;
    assert!(matches!(result, Err(LoadError::Fatal(_))));
}

#[tokio::test]
async fn test_install_offline_leaves_worker_redundant() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());
    network.offline.store(true, Ordering::SeqCst);
    let handle = start(&db, &network, "retroflix-v1");

    assert_eq!(handle.wait_until_settled().await, WorkerState::Redundant);
    assert_eq!(handle.status().await.unwrap().entries, 0);
}

// ============================================================================
// Versioned Activation
// ============================================================================

#[tokio::test]
async fn test_new_version_activation_deletes_old_store() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());

    let v1 = start(&db, &network, "retroflix-v1");
    assert_eq!(v1.wait_until_settled().await, WorkerState::Activated);

    let v2 = start(&db, &network, "retroflix-v2");
    assert_eq!(v2.wait_until_settled().await, WorkerState::Activated);

    let status = v2.status().await.unwrap();
    assert_eq!(status.stores, vec!["retroflix-v2".to_string()]);
    assert_eq!(status.entries, APP_SHELL.len() as i64);

    // Fallback keeps working from the new store
    network.offline.store(true, Ordering::SeqCst);
    let response = v2.fetch(&base().join("style.css").unwrap()).await.unwrap();
    assert!(response.from_cache);
}

#[tokio::test]
async fn test_failed_upgrade_keeps_old_store() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());

    let v1 = start(&db, &network, "retroflix-v1");
    v1.wait_until_settled().await;

    network.offline.store(true, Ordering::SeqCst);
    let v2 = start(&db, &network, "retroflix-v2");
    assert_eq!(v2.wait_until_settled().await, WorkerState::Redundant);

    let names = db.cache_names().await.unwrap();
    assert_eq!(names, vec!["retroflix-v1".to_string()]);

    // The earlier version keeps answering offline requests
    let script = base().join("script.js").unwrap();
    let response = v2.fetch(&script).await.unwrap();
    assert!(response.from_cache);
    assert_eq!(response.body, StubNetwork::body_for(&script));
    assert_eq!(
        v2.status().await.unwrap().serving.as_deref(),
        Some("retroflix-v1")
    );
}

// ============================================================================
// Restart
// ============================================================================

#[tokio::test]
async fn test_restart_while_offline_serves_saved_shell() {
    let db = Database::open(":memory:").await.unwrap();
    let network = Arc::new(StubNetwork::default());

    let first = start(&db, &network, "retroflix-v1");
    assert_eq!(first.wait_until_settled().await, WorkerState::Activated);
    drop(first);

    network.offline.store(true, Ordering::SeqCst);
    let restarted = start(&db, &network, "retroflix-v1");
    assert_eq!(restarted.wait_until_settled().await, WorkerState::Redundant);

    let css = base().join("style.css").unwrap();
    let response = restarted.fetch(&css).await.unwrap();
    assert!(response.from_cache);
    assert_eq!(response.body, StubNetwork::body_for(&css));

    let status = restarted.status().await.unwrap();
    assert_eq!(status.entries, APP_SHELL.len() as i64);
    assert_eq!(status.serving.as_deref(), Some("retroflix-v1"));

    // Documents never cached still fail
    let err = restarted
        .fetch(&base().join("tv.json").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotCached { .. }));
}
