use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::future::try_join_all;
use thiserror::Error;
use tokio::sync::watch;
use url::Url;

use super::manifest::{resolve_manifest, APP_SHELL};
use crate::net::{Fetch, FetchError, Response};
use crate::storage::{CacheEntry, Database};

// ============================================================================
// State & Errors
// ============================================================================

/// Lifecycle of the cache worker.
///
/// `Parsed → Installing → Installed → Activating → Activated`; a failed
/// install ends in `Redundant`. A redundant worker keeps serving the store an
/// earlier run left behind, if there is one, and otherwise only forwards
/// requests to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    /// Whether the lifecycle has reached a resting state.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Activated | Self::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Install failed fetching {url}: {source}")]
    InstallFetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("Install failed: {url} answered HTTP {status}")]
    InstallStatus { url: String, status: u16 },
    #[error("Invalid manifest entry: {0}")]
    Manifest(#[from] url::ParseError),
    #[error("Cannot {action} while {state}")]
    WrongState {
        action: &'static str,
        state: WorkerState,
    },
    #[error("Cache storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Snapshot for `--cache-status` and the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub cache_name: String,
    pub entries: i64,
    pub total_bytes: i64,
    /// Every cache store present, including stale ones awaiting activation
    pub stores: Vec<String>,
    /// Store answering offline requests, if any
    pub serving: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub cache_name: String,
    pub base_url: Url,
    /// Also cache successful network responses once activated
    pub runtime_caching: bool,
}

// ============================================================================
// CacheWorker
// ============================================================================

/// Network-first fetcher with an offline fallback to a versioned cache.
///
/// Clones share the lifecycle state, so a clone can serve requests while
/// another runs install/activate.
#[derive(Clone)]
pub struct CacheWorker {
    db: Database,
    network: Arc<dyn Fetch>,
    config: Arc<WorkerConfig>,
    state: Arc<watch::Sender<WorkerState>>,
    /// Earlier store kept in service after a failed install
    retained: Arc<OnceLock<String>>,
}

impl CacheWorker {
    pub fn new(db: Database, network: Arc<dyn Fetch>, config: WorkerConfig) -> Self {
        let (state, _) = watch::channel(WorkerState::Parsed);
        Self {
            db,
            network,
            config: Arc::new(config),
            state: Arc::new(state),
            retained: Arc::new(OnceLock::new()),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Move `from → to` atomically, failing if another caller got there first.
    fn begin(&self, action: &'static str, from: WorkerState, to: WorkerState) -> Result<(), WorkerError> {
        let mut current = from;
        let moved = self.state.send_if_modified(|state| {
            current = *state;
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });
        if !moved {
            return Err(WorkerError::WrongState {
                action,
                state: current,
            });
        }
        tracing::debug!(cache = %self.config.cache_name, from = %from, to = %to, "Worker state");
        Ok(())
    }

    fn transition(&self, next: WorkerState) {
        let prev = self.state.send_replace(next);
        tracing::debug!(cache = %self.config.cache_name, from = %prev, to = %next, "Worker state");
    }

    /// Pre-cache the app shell into the current cache store.
    ///
    /// Every resource is fetched before anything is written, and the write is
    /// a single transaction, so a failure leaves the store as it was and the
    /// worker `Redundant`, still serving whatever store is already on disk.
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.begin("install", WorkerState::Parsed, WorkerState::Installing)?;

        match self.precache().await {
            Ok(count) => {
                tracing::info!(cache = %self.config.cache_name, entries = count, "Worker installed");
                self.transition(WorkerState::Installed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(cache = %self.config.cache_name, error = %e, "Worker install failed");
                self.retain_previous().await;
                self.transition(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    /// Keep an existing store for offline use: the configured one if an
    /// earlier run installed it, else the newest.
    async fn retain_previous(&self) {
        let names = match self.db.cache_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list cache stores");
                return;
            }
        };
        let kept = names
            .iter()
            .find(|name| **name == self.config.cache_name)
            .or_else(|| names.last());
        if let Some(name) = kept {
            tracing::info!(cache = %name, "Keeping existing cache after failed install");
            let _ = self.retained.set(name.clone());
        }
    }

    /// Store consulted when the network fails, given the current state.
    fn serving_store(&self) -> Option<&str> {
        match self.state() {
            WorkerState::Activated => Some(self.config.cache_name.as_str()),
            WorkerState::Redundant => self.retained.get().map(String::as_str),
            _ => None,
        }
    }

    async fn precache(&self) -> Result<usize, WorkerError> {
        let urls = resolve_manifest(&self.config.base_url, &APP_SHELL)?;

        let network = &self.network;
        let entries = try_join_all(urls.iter().map(|url| async move {
            let response = network
                .fetch(url)
                .await
                .map_err(|source| WorkerError::InstallFetch {
                    url: url.to_string(),
                    source,
                })?;
            if !response.is_success() {
                return Err(WorkerError::InstallStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            Ok(CacheEntry {
                url: url.to_string(),
                status: response.status,
                content_type: response.content_type,
                body: response.body,
            })
        }))
        .await?;

        self.db.put_all(&self.config.cache_name, &entries).await?;
        Ok(entries.len())
    }

    /// Delete every cache store other than the current one. Returns the
    /// names removed.
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        self.begin("activate", WorkerState::Installed, WorkerState::Activating)?;
        self.db.open_cache(&self.config.cache_name).await?;

        let mut removed = Vec::new();
        for name in self.db.cache_names().await? {
            if name != self.config.cache_name && self.db.delete_cache(&name).await? {
                tracing::info!(cache = %name, "Deleted stale cache");
                removed.push(name);
            }
        }

        self.transition(WorkerState::Activated);
        Ok(removed)
    }

    /// Install then activate, logging rather than returning failures.
    pub async fn run_lifecycle(&self) {
        if self.install().await.is_err() {
            return;
        }
        if let Err(e) = self.activate().await {
            tracing::warn!(cache = %self.config.cache_name, error = %e, "Worker activation failed");
        }
    }

    /// Serve one request: network first, cache on transport failure.
    ///
    /// An HTTP error status from the network is returned as-is. The cache is
    /// consulted once the worker is activated, or after a failed install when
    /// an earlier store was kept.
    pub async fn handle_fetch(&self, url: &Url) -> Result<Response, FetchError> {
        let network_err = match self.network.fetch(url).await {
            Ok(response) => {
                if self.config.runtime_caching
                    && response.is_success()
                    && self.state() == WorkerState::Activated
                {
                    self.store_runtime(url, &response).await;
                }
                return Ok(response);
            }
            Err(e) if e.is_transport() => e,
            Err(e) => return Err(e),
        };

        let Some(store) = self.serving_store() else {
            return Err(network_err);
        };

        let cached = self
            .db
            .match_url(url.as_str(), Some(store))
            .await
            .map_err(|e| FetchError::Cache(e.to_string()))?;

        match cached {
            Some(hit) => {
                tracing::info!(url = %url, cache = %hit.cache_name, cause = %network_err, "Served from cache");
                Ok(Response {
                    url: url.clone(),
                    status: hit.status,
                    content_type: hit.content_type,
                    body: hit.body,
                    from_cache: true,
                })
            }
            None => Err(FetchError::NotCached {
                url: url.to_string(),
                cause: network_err.to_string(),
            }),
        }
    }

    async fn store_runtime(&self, url: &Url, response: &Response) {
        let entry = CacheEntry {
            url: url.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            body: response.body.clone(),
        };
        if let Err(e) = self.db.put_response(&self.config.cache_name, &entry).await {
            tracing::warn!(url = %url, error = %e, "Failed to cache runtime response");
        }
    }

    pub async fn status(&self) -> Result<WorkerStatus, WorkerError> {
        let stats = self.db.cache_stats(&self.config.cache_name).await?;
        Ok(WorkerStatus {
            state: self.state(),
            cache_name: self.config.cache_name.clone(),
            entries: stats.entries,
            total_bytes: stats.total_bytes,
            stores: self.db.cache_names().await?,
            serving: self.serving_store().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Answers every URL with 200 and the URL as body unless overridden;
    /// fails with a transport error while offline.
    #[derive(Default)]
    struct StubNetwork {
        overrides: Mutex<HashMap<String, (u16, Vec<u8>)>>,
        offline: AtomicBool,
    }

    impl StubNetwork {
        fn respond(&self, url: &str, status: u16, body: &[u8]) {
            self.overrides
                .lock()
                .unwrap()
                .insert(url.to_string(), (status, body.to_vec()));
        }

        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Fetch for StubNetwork {
        async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(FetchError::Offline);
            }
            let (status, body) = self
                .overrides
                .lock()
                .unwrap()
                .get(url.as_str())
                .cloned()
                .unwrap_or_else(|| (200, url.as_str().as_bytes().to_vec()));
            Ok(Response {
                url: url.clone(),
                status,
                content_type: Some("text/plain".to_string()),
                body,
                from_cache: false,
            })
        }
    }

    const BASE: &str = "http://partners.test/";

    async fn setup(cache_name: &str) -> (CacheWorker, Arc<StubNetwork>, Database) {
        let db = Database::open(":memory:").await.unwrap();
        let network = Arc::new(StubNetwork::default());
        let worker = worker_for(&db, &network, cache_name, false);
        (worker, network, db)
    }

    fn worker_for(
        db: &Database,
        network: &Arc<StubNetwork>,
        cache_name: &str,
        runtime_caching: bool,
    ) -> CacheWorker {
        CacheWorker::new(
            db.clone(),
            network.clone(),
            WorkerConfig {
                cache_name: cache_name.to_string(),
                base_url: Url::parse(BASE).unwrap(),
                runtime_caching,
            },
        )
    }

    fn url(path: &str) -> Url {
        Url::parse(BASE).unwrap().join(path).unwrap()
    }

    #[tokio::test]
    async fn test_install_precaches_whole_manifest() {
        let (worker, _network, db) = setup("retroflix-v1").await;

        worker.install().await.unwrap();

        assert_eq!(worker.state(), WorkerState::Installed);
        let stats = db.cache_stats("retroflix-v1").await.unwrap();
        assert_eq!(stats.entries, APP_SHELL.len() as i64);
    }

    #[tokio::test]
    async fn test_install_is_atomic() {
        let (worker, network, db) = setup("retroflix-v1").await;
        network.respond(url("manifest.json").as_str(), 404, b"missing");

        let err = worker.install().await.unwrap_err();

        assert!(matches!(err, WorkerError::InstallStatus { status: 404, .. }));
        assert_eq!(worker.state(), WorkerState::Redundant);
        assert_eq!(db.cache_stats("retroflix-v1").await.unwrap().entries, 0);
    }

    #[tokio::test]
    async fn test_install_twice_is_rejected() {
        let (worker, _network, _db) = setup("retroflix-v1").await;
        worker.install().await.unwrap();

        let err = worker.install().await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::WrongState {
                action: "install",
                state: WorkerState::Installed
            }
        ));
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let (worker, _network, _db) = setup("retroflix-v1").await;
        assert!(matches!(
            worker.activate().await,
            Err(WorkerError::WrongState { .. })
        ));
        assert_eq!(worker.state(), WorkerState::Parsed);
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_versions() {
        let db = Database::open(":memory:").await.unwrap();
        let network = Arc::new(StubNetwork::default());

        let v1 = worker_for(&db, &network, "retroflix-v1", false);
        v1.run_lifecycle().await;
        assert_eq!(v1.state(), WorkerState::Activated);

        let v2 = worker_for(&db, &network, "retroflix-v2", false);
        v2.install().await.unwrap();
        // Both versions coexist until the new one activates
        assert_eq!(
            db.cache_names().await.unwrap(),
            vec!["retroflix-v1".to_string(), "retroflix-v2".to_string()]
        );

        let removed = v2.activate().await.unwrap();
        assert_eq!(removed, vec!["retroflix-v1".to_string()]);
        assert_eq!(db.cache_names().await.unwrap(), vec!["retroflix-v2".to_string()]);
        assert_eq!(db.cache_stats("retroflix-v1").await.unwrap().entries, 0);
    }

    #[tokio::test]
    async fn test_offline_serves_cached_bytes() {
        let (worker, network, _db) = setup("retroflix-v1").await;
        let css = url("style.css");
        network.respond(css.as_str(), 200, b"body { color: #e50914; }\n\x00\xff");
        worker.run_lifecycle().await;

        network.set_offline(true);
        let response = worker.handle_fetch(&css).await.unwrap();

        assert!(response.from_cache);
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"body { color: #e50914; }\n\x00\xff".to_vec());
    }

    #[tokio::test]
    async fn test_online_prefers_network() {
        let (worker, network, _db) = setup("retroflix-v1").await;
        worker.run_lifecycle().await;

        let css = url("style.css");
        network.respond(css.as_str(), 200, b"fresh");
        let response = worker.handle_fetch(&css).await.unwrap();

        assert!(!response.from_cache);
        assert_eq!(response.body, b"fresh".to_vec());
    }

    #[tokio::test]
    async fn test_http_error_status_is_not_replaced_by_cache() {
        let (worker, network, _db) = setup("retroflix-v1").await;
        worker.run_lifecycle().await;

        let index = url("index.html");
        network.respond(index.as_str(), 500, b"server error");
        let response = worker.handle_fetch(&index).await.unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.from_cache);
    }

    #[tokio::test]
    async fn test_offline_miss_is_not_cached_error() {
        let (worker, network, _db) = setup("retroflix-v1").await;
        worker.run_lifecycle().await;
        network.set_offline(true);

        let err = worker.handle_fetch(&url("tv.json")).await.unwrap_err();
        assert!(matches!(err, FetchError::NotCached { .. }));
    }

    #[tokio::test]
    async fn test_cache_bypassed_before_activation() {
        let (worker, network, _db) = setup("retroflix-v1").await;
        worker.install().await.unwrap();
        network.set_offline(true);

        let err = worker.handle_fetch(&url("style.css")).await.unwrap_err();
        assert!(matches!(err, FetchError::Offline));
    }

    #[tokio::test]
    async fn test_runtime_caching_extends_offline_coverage() {
        let db = Database::open(":memory:").await.unwrap();
        let network = Arc::new(StubNetwork::default());
        let worker = worker_for(&db, &network, "retroflix-v1", true);
        worker.run_lifecycle().await;

        let tv = url("tv.json");
        network.respond(tv.as_str(), 200, br#"[{"id":"1","name":"Star"}]"#);
        worker.handle_fetch(&tv).await.unwrap();

        network.set_offline(true);
        let response = worker.handle_fetch(&tv).await.unwrap();
        assert!(response.from_cache);
        assert_eq!(response.body, br#"[{"id":"1","name":"Star"}]"#.to_vec());
    }

    #[tokio::test]
    async fn test_runtime_caching_off_by_default() {
        let (worker, network, db) = setup("retroflix-v1").await;
        worker.run_lifecycle().await;

        worker.handle_fetch(&url("tv.json")).await.unwrap();
        network.set_offline(true);

        assert!(worker.handle_fetch(&url("tv.json")).await.is_err());
        assert_eq!(
            db.cache_stats("retroflix-v1").await.unwrap().entries,
            APP_SHELL.len() as i64
        );
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let (worker, _network, _db) = setup("retroflix-v1").await;
        worker.run_lifecycle().await;

        let status = worker.status().await.unwrap();
        assert_eq!(status.state, WorkerState::Activated);
        assert_eq!(status.cache_name, "retroflix-v1");
        assert_eq!(status.entries, APP_SHELL.len() as i64);
        assert!(status.total_bytes > 0);
        assert_eq!(status.stores, vec!["retroflix-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_offline_restart_keeps_serving_installed_store() {
        let (first, network, db) = setup("retroflix-v1").await;
        let css = url("style.css");
        network.respond(css.as_str(), 200, b"saved");
        first.run_lifecycle().await;

        network.set_offline(true);
        let restarted = worker_for(&db, &network, "retroflix-v1", false);
        restarted.run_lifecycle().await;

        assert_eq!(restarted.state(), WorkerState::Redundant);
        let response = restarted.handle_fetch(&css).await.unwrap();
        assert!(response.from_cache);
        assert_eq!(response.body, b"saved".to_vec());
        assert_eq!(
            restarted.status().await.unwrap().serving.as_deref(),
            Some("retroflix-v1")
        );
    }

    #[tokio::test]
    async fn test_failed_upgrade_serves_previous_version() {
        let (v1, network, db) = setup("retroflix-v1").await;
        v1.run_lifecycle().await;

        network.set_offline(true);
        let v2 = worker_for(&db, &network, "retroflix-v2", false);
        v2.run_lifecycle().await;

        let response = v2.handle_fetch(&url("index.html")).await.unwrap();
        assert!(response.from_cache);
        assert_eq!(v2.status().await.unwrap().serving.as_deref(), Some("retroflix-v1"));
        assert_eq!(db.cache_names().await.unwrap(), vec!["retroflix-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_first_install_serves_nothing() {
        let (worker, network, _db) = setup("retroflix-v1").await;
        network.set_offline(true);
        worker.run_lifecycle().await;

        let err = worker.handle_fetch(&url("style.css")).await.unwrap_err();
        assert!(matches!(err, FetchError::Offline));
        assert_eq!(worker.status().await.unwrap().serving, None);
    }
}
