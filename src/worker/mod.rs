//! Offline cache worker.
//!
//! Runs beside the UI as its own set of tasks and answers every static
//! document request network-first, falling back to a versioned SQLite cache
//! when the network cannot be reached.

mod handle;
mod lifecycle;
mod manifest;

pub use handle::{spawn, WorkerHandle};
pub use lifecycle::{CacheWorker, WorkerConfig, WorkerError, WorkerState, WorkerStatus};
pub use manifest::{resolve_manifest, APP_SHELL, DEFAULT_CACHE_NAME};
