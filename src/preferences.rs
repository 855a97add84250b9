//! Preference store: config.toml defaults overlaid with saved values.
//!
//! Reads come from an in-memory map. Writes update the map immediately and
//! are queued to a single writer task that persists them to the
//! `user_preferences` table in order, so the UI never waits on SQLite.
//! `flush` waits for the queue to drain (used on shutdown).
use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use crate::config::Config;
use crate::storage::Database;

pub const KEY_VIEW_MODE: &str = "viewPreference";
pub const KEY_THEME: &str = "theme";
pub const KEY_HAS_VISITED: &str = "hasVisited";

/// String key-value persistence as seen by the list engine and the app.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

// ============================================================================
// PreferenceManager
// ============================================================================

pub struct PreferenceManager {
    prefs: HashMap<String, String>,
    writer: Option<mpsc::UnboundedSender<WriterMsg>>,
}

impl PreferenceManager {
    /// Merge config defaults with saved values (saved wins) and start the
    /// writer task for `db`.
    pub async fn load(config: &Config, db: &Database) -> Result<Self> {
        let mut prefs = Self::defaults(config);
        for (key, value) in db.all_preferences().await? {
            prefs.insert(key, value);
        }

        Ok(Self {
            prefs,
            writer: Some(spawn_writer(db.clone())),
        })
    }

    /// Config defaults only, nothing persisted.
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefs: Self::defaults(config),
            writer: None,
        }
    }

    /// Empty, non-persistent store.
    pub fn in_memory() -> Self {
        Self {
            prefs: HashMap::new(),
            writer: None,
        }
    }

    pub fn theme(&self) -> &str {
        self.prefs.get(KEY_THEME).map(String::as_str).unwrap_or("dark")
    }

    pub fn has_visited(&self) -> bool {
        self.prefs.get(KEY_HAS_VISITED).is_some_and(|v| v == "true")
    }

    fn defaults(config: &Config) -> HashMap<String, String> {
        HashMap::from([(KEY_THEME.to_string(), config.theme.clone())])
    }
}

impl PreferenceStore for PreferenceManager {
    fn get(&self, key: &str) -> Option<String> {
        self.prefs.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.prefs.get(key).is_some_and(|v| v == value) {
            return;
        }
        self.prefs.insert(key.to_string(), value.to_string());
        if let Some(writer) = &self.writer {
            if writer
                .send(WriterMsg::Set(key.to_string(), value.to_string()))
                .is_err()
            {
                tracing::warn!(key = %key, "Preference writer stopped; value kept in memory only");
            }
        }
    }
}

enum WriterMsg {
    Set(String, String),
    Flush(oneshot::Sender<()>),
}

fn spawn_writer(db: Database) -> mpsc::UnboundedSender<WriterMsg> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WriterMsg>();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                WriterMsg::Set(key, value) => {
                    if let Err(e) = db.set_preference(&key, &value).await {
                        tracing::warn!(key = %key, error = %e, "Failed to persist preference");
                    }
                }
                WriterMsg::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        tracing::debug!("Preference writer finished");
    });
    tx
}

impl PreferenceManager {
    /// Wait until every write queued so far has reached the database.
    pub async fn flush(&self) -> Result<()> {
        let Some(writer) = &self.writer else {
            return Ok(());
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        writer
            .send(WriterMsg::Flush(ack_tx))
            .map_err(|_| anyhow::anyhow!("preference writer stopped"))?;
        ack_rx
            .await
            .map_err(|_| anyhow::anyhow!("preference writer stopped before flushing"))
    }
}

// ============================================================================
// Tests
// ============================================================================
