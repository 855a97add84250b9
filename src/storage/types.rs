use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds the database lock
    #[error("Another instance of retroflix appears to be running. Please close it and try again.")]
    InstanceLocked,

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify lock contention (SQLITE_BUSY, SQLITE_LOCKED, CANTOPEN) apart
    /// from other failures.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

pub(crate) fn is_lock_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("database is locked")
        || lower.contains("database table is locked")
        || lower.contains("sqlite_busy")
        || lower.contains("sqlite_locked")
        || lower.contains("unable to open database file")
}

// ============================================================================
// Offline cache rows
// ============================================================================

/// A response about to be written into a cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// A stored response, as read back from `cache_entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub cache_name: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Lowercase hex SHA-256 of `body`, checked on every read
    pub sha256: String,
    pub stored_at: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CachedResponseRow {
    pub cache_name: String,
    pub url: String,
    pub status: i64,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub sha256: String,
    pub stored_at: String,
}

impl CachedResponseRow {
    pub(crate) fn into_response(self) -> CachedResponse {
        CachedResponse {
            cache_name: self.cache_name,
            url: self.url,
            status: u16::try_from(self.status).unwrap_or(0),
            content_type: self.content_type,
            body: self.body,
            sha256: self.sha256,
            stored_at: self.stored_at,
        }
    }
}

/// Size of one cache store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: i64,
    pub total_bytes: i64,
}
