use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use url::Url;

use super::lifecycle::{CacheWorker, WorkerError, WorkerState, WorkerStatus};
use crate::net::{Fetch, FetchError, Response};

/// Requests queued before the dispatcher picks them up.
const REQUEST_QUEUE: usize = 64;

enum WorkerRequest {
    Fetch {
        url: Url,
        reply: oneshot::Sender<Result<Response, FetchError>>,
    },
    Status {
        reply: oneshot::Sender<Result<WorkerStatus, WorkerError>>,
    },
}

/// Client side of a running cache worker.
///
/// Cheap to clone. Dropping every handle stops the dispatcher once the
/// in-flight requests finish.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<WorkerRequest>,
    state: watch::Receiver<WorkerState>,
}

/// Start the worker: one task runs install/activate, another dispatches
/// requests, each fetch in its own task so a slow response never blocks
/// the rest.
pub fn spawn(worker: CacheWorker) -> WorkerHandle {
    let (tx, mut rx) = mpsc::channel::<WorkerRequest>(REQUEST_QUEUE);
    let state = worker.subscribe();

    let lifecycle = worker.clone();
    tokio::spawn(async move {
        lifecycle.run_lifecycle().await;
    });

    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let worker = worker.clone();
            match request {
                WorkerRequest::Fetch { url, reply } => {
                    tokio::spawn(async move {
                        let result = worker.handle_fetch(&url).await;
                        // Caller may have given up; nothing to do then.
                        let _ = reply.send(result);
                    });
                }
                WorkerRequest::Status { reply } => {
                    tokio::spawn(async move {
                        let _ = reply.send(worker.status().await);
                    });
                }
            }
        }
        tracing::debug!("Worker dispatcher stopped");
    });

    WorkerHandle { tx, state }
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub async fn status(&self) -> anyhow::Result<WorkerStatus> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(WorkerRequest::Status { reply })
            .await
            .map_err(|_| FetchError::WorkerGone)?;
        let status = rx.await.map_err(|_| FetchError::WorkerGone)??;
        Ok(status)
    }

    /// Wait until install/activate has finished one way or the other.
    pub async fn wait_until_settled(&self) -> WorkerState {
        let mut rx = self.state.clone();
        let settled = rx.wait_for(|state| state.is_settled()).await.map(|state| *state).ok();
        // Sender gone: report whatever was last published
        settled.unwrap_or_else(|| *rx.borrow())
    }
}

#[async_trait]
impl Fetch for WorkerHandle {
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(WorkerRequest::Fetch {
                url: url.clone(),
                reply,
            })
            .await
            .map_err(|_| FetchError::WorkerGone)?;
        rx.await.map_err(|_| FetchError::WorkerGone)?
    }
}
