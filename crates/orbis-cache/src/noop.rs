//! No-op store implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use orbis_core::{CacheCategory, CacheDocument, ChartStore, Result};
use tracing::trace;

/// A store that doesn't keep anything.
///
/// `get` always returns `Ok(None)` and `put` always returns `Ok(())`, so every
/// request recomputes both bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChartStore for NoopCache {
    async fn get(&self, category: CacheCategory, _key: &str) -> Result<Option<CacheDocument>> {
        trace!(%category, "NoopCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _document: &CacheDocument) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn remove_daily_before(&self, _cutoff: NaiveDate) -> Result<usize> {
        trace!("NoopCache: remove_daily_before called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, natal_doc};

    #[tokio::test]
    async fn test_put_then_get_misses() {
        let cache = NoopCache::new();
        let doc = natal_doc(10.0);
        cache.put(&doc).await.unwrap();
        assert!(cache.get(CacheCategory::Natal, &doc.key).await.unwrap().is_none());
        assert_eq!(cache.remove_daily_before(date(30)).await.unwrap(), 0);
        assert!(cache.clear().await.is_ok());
    }
}
