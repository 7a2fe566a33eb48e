//! In-memory store implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use orbis_core::{CacheCategory, CacheDocument, ChartStore, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// In-memory chart store for testing and development.
///
/// Documents are stored in a `RwLock`-protected `HashMap` and are lost when the
/// store is dropped. Documents are cloned on get and put.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    documents: RwLock<HashMap<(CacheCategory, String), CacheDocument>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents in a tier.
    pub async fn len(&self, category: CacheCategory) -> usize {
        self.documents
            .read()
            .await
            .keys()
            .filter(|(c, _)| *c == category)
            .count()
    }
}

#[async_trait]
impl ChartStore for InMemoryCache {
    #[instrument(skip(self), fields(category = %category, key = %key))]
    async fn get(&self, category: CacheCategory, key: &str) -> Result<Option<CacheDocument>> {
        let documents = self.documents.read().await;
        match documents.get(&(category, key.to_string())) {
            Some(doc) => {
                debug!("Cache hit");
                Ok(Some(doc.clone()))
            }
            None => {
                debug!("Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, document), fields(category = %document.category, key = %document.key))]
    async fn put(&self, document: &CacheDocument) -> Result<()> {
        let mut documents = self.documents.write().await;
        match documents.entry((document.category, document.key.clone())) {
            Entry::Occupied(_) if document.category == CacheCategory::Natal => {
                debug!("Natal document already stored, keeping it");
            }
            Entry::Occupied(mut slot) => {
                slot.insert(document.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(document.clone());
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_daily_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|(category, _), doc| {
            *category != CacheCategory::Daily || doc.reference_date.is_none_or(|d| d >= cutoff)
        });
        let removed = before - documents.len();
        if removed > 0 {
            debug!("Removed {} stale daily documents", removed);
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.documents.write().await.clear();
        debug!("Cleared all documents");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{daily_doc, date, natal_doc};

    #[tokio::test]
    async fn test_get_miss_then_hit() {
        let cache = InMemoryCache::new();
        let doc = natal_doc(56.3);

        assert!(cache.get(CacheCategory::Natal, &doc.key).await.unwrap().is_none());
        cache.put(&doc).await.unwrap();
        let stored = cache.get(CacheCategory::Natal, &doc.key).await.unwrap().unwrap();
        assert_eq!(stored.fields["natal_sun"], "56.3");

        // Same key, other tier: no hit.
        assert!(cache.get(CacheCategory::Daily, &doc.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_natal_insert_if_absent() {
        let cache = InMemoryCache::new();
        cache.put(&natal_doc(1.0)).await.unwrap();
        cache.put(&natal_doc(2.0)).await.unwrap();

        let key = natal_doc(0.0).key;
        let stored = cache.get(CacheCategory::Natal, &key).await.unwrap().unwrap();
        assert_eq!(stored.fields["natal_sun"], "1.0");
        assert_eq!(cache.len(CacheCategory::Natal).await, 1);
    }

    #[tokio::test]
    async fn test_daily_replaces() {
        let cache = InMemoryCache::new();
        cache.put(&daily_doc(date(1), 1)).await.unwrap();
        cache.put(&daily_doc(date(1), 2)).await.unwrap();

        let key = daily_doc(date(1), 0).key;
        let stored = cache.get(CacheCategory::Daily, &key).await.unwrap().unwrap();
        assert_eq!(stored.fields["transit_marker"], "2");
        assert!(stored.is_valid_for(date(1)));
    }

    #[tokio::test]
    async fn test_remove_daily_before() {
        let cache = InMemoryCache::new();
        cache.put(&natal_doc(1.0)).await.unwrap();
        for day in 1..=5 {
            cache.put(&daily_doc(date(day), day)).await.unwrap();
        }

        let removed = cache.remove_daily_before(date(4)).await.unwrap();
        assert_eq!(removed, 3);
        assert_eq!(cache.len(CacheCategory::Daily).await, 2);
        assert_eq!(cache.len(CacheCategory::Natal).await, 1);

        cache.clear().await.unwrap();
        assert_eq!(cache.len(CacheCategory::Natal).await, 0);
    }
}
