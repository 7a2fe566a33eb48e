//! SQLite-backed store implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use orbis_core::{CacheCategory, CacheDocument, ChartError, ChartStore, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// SQLite-backed chart store.
///
/// Documents persist across restarts in two tables, `natal_charts` and
/// `daily_charts`. Each row holds the whole document as JSON next to the
/// columns used for lookup and expiry. Statements are short and run under a
/// connection mutex on the calling task.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open or create a store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ChartError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory store.
    ///
    /// Data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| ChartError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS natal_charts (
                key TEXT PRIMARY KEY,
                document_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ChartError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_charts (
                key TEXT PRIMARY KEY,
                natal_key TEXT,
                reference_date TEXT,
                document_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ChartError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_reference_date
             ON daily_charts(reference_date)",
            [],
        )
        .map_err(|e| ChartError::Cache(e.to_string()))?;

        debug!("SQLite chart schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ChartStore for SqliteCache {
    #[instrument(skip(self), fields(category = %category, key = %key))]
    async fn get(&self, category: CacheCategory, key: &str) -> Result<Option<CacheDocument>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        let sql = format!(
            "SELECT document_json FROM {} WHERE key = ?1",
            category.collection()
        );
        let json = conn
            .query_row(&sql, params![key], |row| row.get::<_, String>(0))
            .optional()
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        match json {
            Some(json) => {
                debug!("Cache hit");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!("Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, document), fields(category = %document.category, key = %document.key))]
    async fn put(&self, document: &CacheDocument) -> Result<()> {
        let json = serde_json::to_string(document)?;
        let created_at = document.created_at.to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        let written = match document.category {
            CacheCategory::Natal => conn.execute(
                "INSERT OR IGNORE INTO natal_charts (key, document_json, created_at)
                 VALUES (?1, ?2, ?3)",
                params![document.key, json, created_at],
            ),
            CacheCategory::Daily => conn.execute(
                "INSERT OR REPLACE INTO daily_charts
                 (key, natal_key, reference_date, document_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    document.key,
                    document.natal_key,
                    document.reference_date.map(|d| d.to_string()),
                    json,
                    created_at
                ],
            ),
        }
        .map_err(|e| ChartError::Cache(e.to_string()))?;

        debug!(written, bytes = json.len(), "Stored document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_daily_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        let deleted = conn
            .execute(
                "DELETE FROM daily_charts WHERE reference_date < ?1",
                params![cutoff.to_string()],
            )
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Removed {} stale daily documents", deleted);
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM natal_charts", [])
            .map_err(|e| ChartError::Cache(e.to_string()))?;
        conn.execute("DELETE FROM daily_charts", [])
            .map_err(|e| ChartError::Cache(e.to_string()))?;

        debug!("Cleared all documents");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{daily_doc, date, natal_doc};

    #[tokio::test]
    async fn test_initialization() {
        assert!(SqliteCache::in_memory().is_ok());
    }

    #[tokio::test]
    async fn test_natal_roundtrip_and_insert_if_absent() {
        let cache = SqliteCache::in_memory().unwrap();
        let first = natal_doc(1.5);
        assert!(cache.get(CacheCategory::Natal, &first.key).await.unwrap().is_none());

        cache.put(&first).await.unwrap();
        cache.put(&natal_doc(9.0)).await.unwrap();

        let stored = cache.get(CacheCategory::Natal, &first.key).await.unwrap().unwrap();
        assert_eq!(stored.fields, first.fields);
        assert_eq!(stored.birth, first.birth);
        assert_eq!(stored.category, CacheCategory::Natal);
    }

    #[tokio::test]
    async fn test_daily_replace_and_expiry() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put(&daily_doc(date(2), 1)).await.unwrap();
        cache.put(&daily_doc(date(2), 7)).await.unwrap();
        cache.put(&daily_doc(date(9), 1)).await.unwrap();

        let key = daily_doc(date(2), 0).key;
        let stored = cache.get(CacheCategory::Daily, &key).await.unwrap().unwrap();
        assert_eq!(stored.fields["transit_marker"], "7");
        assert_eq!(stored.reference_date, Some(date(2)));

        assert_eq!(cache.remove_daily_before(date(5)).await.unwrap(), 1);
        assert!(cache.get(CacheCategory::Daily, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_backed_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.db");
        let doc = natal_doc(3.0);

        {
            let cache = SqliteCache::new(&path).unwrap();
            cache.put(&doc).await.unwrap();
        }

        let reopened = SqliteCache::new(&path).unwrap();
        assert!(reopened.get(CacheCategory::Natal, &doc.key).await.unwrap().is_some());

        reopened.clear().await.unwrap();
        assert!(reopened.get(CacheCategory::Natal, &doc.key).await.unwrap().is_none());
    }
}
