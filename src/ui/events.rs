//! Application event handling.
//!
//! Applies the results of background tasks (content loads, stream pushes,
//! animation timers) to the application state.

use tokio::sync::mpsc;

use crate::app::{App, AppEvent, BundleOutcome};

use super::helpers::initialize_app;

/// Handle one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::BundleLoaded(result) => match app.accept_bundle(result) {
            BundleOutcome::Initialize => initialize_app(app, event_tx),
            BundleOutcome::ShowGate => tracing::info!("First visit, showing welcome screen"),
            BundleOutcome::Fatal => {}
        },

        AppEvent::CollectionsLoaded { generation, result } => {
            app.accept_collections(generation, result);
        }

        AppEvent::Stream(event) => app.accept_stream_event(event),

        AppEvent::DismissAnimationEnded { id } => {
            if app.notifications.finish_dismiss(&id) {
                tracing::debug!(id = %id, "Notification dismissed");
            }
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Task panicked");
            app.set_status(format!("Internal error in {task}"));
        }
    }
    app.needs_redraw = true;
}
