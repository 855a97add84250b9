mod cache_store;
mod preferences;
mod schema;
mod types;

pub use schema::Database;
pub use types::{CacheEntry, CacheStats, CachedResponse, DatabaseError};
