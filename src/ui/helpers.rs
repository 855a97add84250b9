//! Background task spawning shared by the input and event handlers.
//!
//! Every task reports back through `AppEvent`; none touches `App` directly.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::app::{App, AppEvent};
use crate::content::{load_bundle, load_collections};
use crate::notifications::{run_notification_stream, DISMISS_ANIMATION};
use crate::util::validate_link;

/// Wraps a future to catch panics and convert them to errors.
///
/// Without this a panicking task just disappears; with it the loop gets an
/// `AppEvent::TaskPanicked` and can tell the user.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            }
        })
}

async fn report_panic(tx: &mpsc::Sender<AppEvent>, task: &'static str, error: String) {
    tracing::error!(task, error = %error, "Background task panicked");
    let _ = tx.send(AppEvent::TaskPanicked { task, error }).await;
}

// ============================================================================
// Content
// ============================================================================

/// Fetch `content.json`. The result arrives as `AppEvent::BundleLoaded`.
pub(super) fn spawn_bundle_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(handle) = app.bundle_handle.take() {
        handle.abort();
    }

    let fetch = app.fetch.clone();
    let base = app.base_url.clone();
    let tx = event_tx.clone();

    app.bundle_handle = Some(tokio::spawn(async move {
        match catch_task_panic(async { load_bundle(fetch.as_ref(), &base).await }).await {
            Ok(result) => {
                if tx.send(AppEvent::BundleLoaded(result)).await.is_err() {
                    tracing::debug!("Bundle loaded after UI exit");
                }
            }
            Err(panic_msg) => report_panic(&tx, "bundle load", panic_msg).await,
        }
    }));
}

/// Fetch both partner collections under a fresh generation. Any load still
/// in flight is aborted, and its result would be ignored anyway.
pub(super) fn spawn_collections_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let generation = app.begin_collections_load();
    let fetch = app.fetch.clone();
    let base = app.base_url.clone();
    let tx = event_tx.clone();

    tracing::debug!(generation, "Loading partner collections");

    app.collections_handle = Some(tokio::spawn(async move {
        match catch_task_panic(async { load_collections(fetch.as_ref(), &base).await }).await {
            Ok(result) => {
                let _ = tx
                    .send(AppEvent::CollectionsLoaded { generation, result })
                    .await;
            }
            Err(panic_msg) => report_panic(&tx, "collections load", panic_msg).await,
        }
    }));
}

// ============================================================================
// Notifications
// ============================================================================

/// Open the push channel, if one is configured. Stream events are forwarded
/// into the app event queue.
pub(super) fn spawn_notification_stream(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(target) = app.stream_target.clone() else {
        tracing::info!("No notification stream configured");
        return;
    };
    if app.stream_handle.is_some() {
        return;
    }

    let tx = event_tx.clone();
    app.stream_handle = Some(tokio::spawn(async move {
        let (stream_tx, mut stream_rx) = mpsc::channel(16);
        let stream = tokio::spawn(run_notification_stream(target.client, target.url, stream_tx));

        while let Some(event) = stream_rx.recv().await {
            if tx.send(AppEvent::Stream(event)).await.is_err() {
                break;
            }
        }
        stream.abort();

        if let Err(e) = stream.await {
            if e.is_panic() {
                report_panic(&tx, "notification stream", "stream task panicked".to_string())
                    .await;
            }
        }
    }));
}

/// Signal the end of a dismiss animation after it has played.
pub(super) fn spawn_dismiss_timer(id: String, event_tx: &mpsc::Sender<AppEvent>) {
    let tx = event_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(DISMISS_ANIMATION).await;
        let _ = tx.send(AppEvent::DismissAnimationEnded { id }).await;
    });
}

// ============================================================================
// Startup
// ============================================================================

/// Everything that happens once the visitor is past the welcome screen:
/// theme, collections, and the push channel.
pub(super) fn initialize_app(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    tracing::info!("Initializing main view");
    app.mark_initialized();
    spawn_collections_load(app, event_tx);
    spawn_notification_stream(app, event_tx);
}

// ============================================================================
// Links
// ============================================================================

/// Open a partner link in the system browser after validating it.
pub(super) fn open_link(app: &mut App, link: &str) {
    match validate_link(link) {
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                tracing::warn!(url = %url, error = %e, "Failed to open browser");
                app.set_status(format!("Could not open browser: {e}"));
            } else {
                app.set_status(format!("Opened {}", url.host_str().unwrap_or("link")));
            }
        }
        Err(e) => {
            tracing::warn!(link = %link, error = %e, "Refused partner link");
            app.set_status(e.to_string());
        }
    }
}
