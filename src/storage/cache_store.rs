use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use super::schema::Database;
use super::types::{CacheEntry, CacheStats, CachedResponse, CachedResponseRow};

pub(crate) fn body_digest(body: &[u8]) -> String {
    format!("{:x}", Sha256::digest(body))
}

/// Millisecond RFC 3339 in UTC, so stored_at sorts as text.
fn stored_at_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Database {
    // ========================================================================
    // Offline Cache Stores
    // ========================================================================

    /// Create the named cache store if it does not exist yet.
    pub async fn open_cache(&self, name: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO cache_stores (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Names of every cache store, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM cache_stores ORDER BY created_at, name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Delete a cache store and all its entries. Returns `false` if no such
    /// store existed.
    pub async fn delete_cache(&self, name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM cache_entries WHERE cache_name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM cache_stores WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Write a batch of entries into `name` in a single transaction, creating
    /// the store if needed. Either every entry lands or none does.
    pub async fn put_all(&self, name: &str, entries: &[CacheEntry]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let stored_at = stored_at_now();

        sqlx::query("INSERT OR IGNORE INTO cache_stores (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO cache_entries
                    (cache_name, url, status, content_type, body, sha256, stored_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(cache_name, url) DO UPDATE SET
                    status = excluded.status,
                    content_type = excluded.content_type,
                    body = excluded.body,
                    sha256 = excluded.sha256,
                    stored_at = excluded.stored_at
            "#,
            )
            .bind(name)
            .bind(&entry.url)
            .bind(i64::from(entry.status))
            .bind(entry.content_type.as_deref())
            .bind(&entry.body)
            .bind(body_digest(&entry.body))
            .bind(&stored_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Store a single response (runtime caching).
    pub async fn put_response(&self, name: &str, entry: &CacheEntry) -> Result<()> {
        self.put_all(name, std::slice::from_ref(entry)).await
    }

    /// Look up `url` across every cache store.
    ///
    /// `preferred` is searched first; other stores are consulted newest entry
    /// first. A row whose body no longer matches its stored digest is treated
    /// as a miss.
    pub async fn match_url(
        &self,
        url: &str,
        preferred: Option<&str>,
    ) -> Result<Option<CachedResponse>> {
        let rows: Vec<CachedResponseRow> = sqlx::query_as(
            r#"
            SELECT cache_name, url, status, content_type, body, sha256, stored_at
            FROM cache_entries
            WHERE url = ?
            ORDER BY (cache_name = ?) DESC, stored_at DESC
        "#,
        )
        .bind(url)
        .bind(preferred.unwrap_or(""))
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            if body_digest(&row.body) == row.sha256 {
                return Ok(Some(row.into_response()));
            }
            tracing::warn!(
                cache = %row.cache_name,
                url = %row.url,
                "Cached body failed integrity check, ignoring entry"
            );
        }
        Ok(None)
    }

    /// Entry count and body bytes of one store.
    pub async fn cache_stats(&self, name: &str) -> Result<CacheStats> {
        let row: (i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(LENGTH(body)) FROM cache_entries WHERE cache_name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(CacheStats {
            entries: row.0,
            total_bytes: row.1.unwrap_or(0),
        })
    }
}
