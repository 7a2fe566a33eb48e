//! Two-tier chart cache around a [`ChartEngine`].
//!
//! A request maps to a natal key (birth fingerprint) and a daily key (natal
//! key plus reference date). The natal bundle is computed once per birth and
//! the daily bundle once per birth and date. Store failures never fail a
//! request: the chart is computed and reported as [`CacheStatus::Uncached`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use orbis_calc::{ChartDocument, ChartEngine, ChartRequest, DailyBundle, NatalBundle, OffsetPolicy};
use orbis_core::{
    BirthFingerprint, CacheCategory, CacheDocument, ChartError, ChartStore, CivilInstant, Result,
    daily_key,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::context::CacheConfig;

/// How a chart was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Both bundles came from the store.
    FullHit,
    /// The natal bundle came from the store; the daily bundle was computed.
    NatalHit,
    /// Both bundles were computed and written.
    Calculated,
    /// The store was missing or failing; nothing was cached.
    Uncached,
}

impl CacheStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullHit => "full_hit",
            Self::NatalHit => "natal_hit",
            Self::Calculated => "calculated",
            Self::Uncached => "uncached",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chart together with its cache provenance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartResponse {
    /// The chart.
    #[serde(flatten)]
    pub document: ChartDocument,
    /// How it was produced.
    pub cache_status: CacheStatus,
    /// Key of the natal document.
    pub natal_key: String,
    /// Key of the daily document.
    pub daily_key: String,
}

/// Serves charts from a [`ChartStore`], computing what is missing.
///
/// Engine calls run on the blocking thread pool. With advisory locks on,
/// concurrent requests for the same birth wait for each other, so the natal
/// bundle is computed once per process even under a burst of first requests.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use orbis::{ChartCacheManager, ChartRequest, InMemoryCache, OrbisContext};
///
/// let manager = OrbisContext::default()
///     .with_store(Arc::new(InMemoryCache::new()))
///     .manager();
/// let request = ChartRequest::parse("1990-05-17", "08:30", 41.0, 29.0)?;
/// let response = manager.get_chart(&request, chrono::Utc::now()).await?;
/// assert_eq!(response.cache_status, orbis::CacheStatus::Calculated);
/// ```
pub struct ChartCacheManager {
    engine: Arc<dyn ChartEngine>,
    store: Option<Arc<dyn ChartStore>>,
    config: CacheConfig,
    offset_policy: OffsetPolicy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ChartCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartCacheManager")
            .field("engine", &self.engine)
            .field("store", &self.store.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .field("offset_policy", &self.offset_policy)
            .finish()
    }
}

impl ChartCacheManager {
    /// Creates a manager without a store.
    #[must_use]
    pub fn new(engine: Arc<dyn ChartEngine>) -> Self {
        Self {
            engine,
            store: None,
            config: CacheConfig::default(),
            offset_policy: OffsetPolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ChartStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the cache settings.
    #[must_use]
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the offset policy used to resolve the reference date.
    ///
    /// Must match the engine's policy, or daily keys drift from the dates
    /// the engine computes for.
    #[must_use]
    pub const fn with_offset_policy(mut self, policy: OffsetPolicy) -> Self {
        self.offset_policy = policy;
        self
    }

    /// The cache settings.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns `true` when a store is configured.
    #[must_use]
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the chart for a request, from the store where possible.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] for unusable request parameters.
    /// Store failures are logged and never returned.
    #[instrument(skip(self, request), fields(date = %request.birth_date))]
    pub async fn get_chart(
        &self,
        request: &ChartRequest,
        now: DateTime<Utc>,
    ) -> Result<ChartResponse> {
        let reference = request.reference_instant(now, self.offset_policy)?;
        let fingerprint = request.fingerprint();
        let natal_key = fingerprint.natal_key();
        let daily_key = daily_key(&natal_key, reference.date);

        let (document, cache_status) = match &self.store {
            Some(store) => {
                let _guard = self.acquire(&natal_key).await;
                self.lookup_or_compute(
                    store.as_ref(),
                    request,
                    &reference,
                    &fingerprint,
                    &natal_key,
                    &daily_key,
                )
                .await?
            }
            None => {
                debug!("No store configured, computing chart");
                (self.compute(request, reference).await?, CacheStatus::Uncached)
            }
        };

        debug!(status = %cache_status, natal_key = %natal_key, daily_key = %daily_key, "Chart ready");
        Ok(ChartResponse {
            document,
            cache_status,
            natal_key,
            daily_key,
        })
    }

    async fn lookup_or_compute(
        &self,
        store: &dyn ChartStore,
        request: &ChartRequest,
        reference: &CivilInstant,
        fingerprint: &BirthFingerprint,
        natal_key: &str,
        daily_key: &str,
    ) -> Result<(ChartDocument, CacheStatus)> {
        let cached_natal = match store.get(CacheCategory::Natal, natal_key).await {
            Ok(doc) => doc.and_then(|doc| decode::<NatalBundle>(&doc)),
            Err(e) => {
                warn!(error = %e, "Chart store unavailable, computing without cache");
                let document = self.compute(request, *reference).await?;
                return Ok((document, CacheStatus::Uncached));
            }
        };

        let Some(natal) = cached_natal else {
            debug!("Natal cache miss, computing both bundles");
            let document = self.compute(request, *reference).await?;
            let natal_doc =
                CacheDocument::natal(natal_key.to_string(), fingerprint.clone(), &document.natal)?;
            let daily_doc = CacheDocument::daily(
                daily_key.to_string(),
                natal_key.to_string(),
                reference.date,
                fingerprint.clone(),
                &document.daily,
            )?;
            let natal_stored = self.persist(store, &natal_doc).await;
            let daily_stored = self.persist(store, &daily_doc).await;
            let status = if natal_stored && daily_stored {
                CacheStatus::Calculated
            } else {
                CacheStatus::Uncached
            };
            return Ok((document, status));
        };
        cached_settings_differ(request, &natal);

        match store.get(CacheCategory::Daily, daily_key).await {
            Ok(Some(doc)) if doc.is_valid_for(reference.date) => {
                if let Some(daily) = decode::<DailyBundle>(&doc) {
                    debug!("Full cache hit");
                    return Ok((ChartDocument { natal, daily }, CacheStatus::FullHit));
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Daily lookup failed, computing without cache");
                let document = self.compute_daily(request, natal, *reference).await?;
                return Ok((document, CacheStatus::Uncached));
            }
        }

        debug!("Natal cache hit, computing daily bundle");
        let document = self.compute_daily(request, natal, *reference).await?;
        let daily_doc = CacheDocument::daily(
            daily_key.to_string(),
            natal_key.to_string(),
            reference.date,
            fingerprint.clone(),
            &document.daily,
        )?;
        let status = if self.persist(store, &daily_doc).await {
            CacheStatus::NatalHit
        } else {
            CacheStatus::Uncached
        };
        Ok((document, status))
    }

    /// Writes a document unless it exceeds the size cap.
    ///
    /// Returns `false` only when the store rejected the write.
    async fn persist(&self, store: &dyn ChartStore, document: &CacheDocument) -> bool {
        let bytes = document.size_bytes();
        if bytes > self.config.max_document_bytes {
            warn!(
                category = %document.category,
                key = %document.key,
                bytes,
                limit = self.config.max_document_bytes,
                "Document exceeds size cap, not cached"
            );
            return true;
        }

        match store.put(document).await {
            Ok(()) => {
                debug!(category = %document.category, key = %document.key, bytes, "Cached document");
                true
            }
            Err(e) => {
                warn!(
                    category = %document.category,
                    key = %document.key,
                    error = %e,
                    "Failed to cache document"
                );
                false
            }
        }
    }

    async fn compute(&self, request: &ChartRequest, reference: CivilInstant) -> Result<ChartDocument> {
        let engine = Arc::clone(&self.engine);
        let request = request.clone();
        run_blocking(move || {
            let natal = engine.natal(&request)?;
            let daily = engine.daily(&request, &natal, &reference)?;
            Ok(ChartDocument { natal, daily })
        })
        .await
    }

    async fn compute_daily(
        &self,
        request: &ChartRequest,
        natal: NatalBundle,
        reference: CivilInstant,
    ) -> Result<ChartDocument> {
        let engine = Arc::clone(&self.engine);
        let request = request.clone();
        run_blocking(move || {
            let daily = engine.daily(&request, &natal, &reference)?;
            Ok(ChartDocument { natal, daily })
        })
        .await
    }

    async fn acquire(&self, key: &str) -> Option<OwnedMutexGuard<()>> {
        if !self.config.advisory_locks {
            return None;
        }
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        Some(lock.lock_owned().await)
    }

    /// Removes daily documents whose reference date is more than
    /// `retention_days` before `today`.
    ///
    /// `None` uses the configured retention. Without a store nothing happens.
    ///
    /// # Errors
    /// Returns [`ChartError::Cache`] if the store fails.
    #[instrument(skip(self))]
    pub async fn cleanup_stale_daily(
        &self,
        today: NaiveDate,
        retention_days: Option<u32>,
    ) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let days = retention_days.unwrap_or(self.config.daily_retention_days);
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        let removed = store.remove_daily_before(cutoff).await?;
        info!(removed, %cutoff, "Removed stale daily charts");
        Ok(removed)
    }
}

/// The natal key covers only birth date, time and coordinates, so a cached
/// bundle is served even when the request asks for another house system or
/// UTC offset. Returns `true` and logs when that happens.
fn cached_settings_differ(request: &ChartRequest, natal: &NatalBundle) -> bool {
    let info = &natal.birth_info;
    let differs = request.house_system.is_some_and(|s| s != info.house_system)
        || request
            .utc_offset_minutes
            .is_some_and(|m| m != info.utc_offset_minutes);
    if differs {
        debug!(
            cached_house_system = %info.house_system,
            cached_utc_offset = info.utc_offset_minutes,
            "Request settings differ from the cached natal bundle, serving it as stored"
        );
    }
    differs
}

fn decode<T: DeserializeOwned>(document: &CacheDocument) -> Option<T> {
    match document.bundle() {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            warn!(
                category = %document.category,
                key = %document.key,
                error = %e,
                "Unreadable cached document, recomputing"
            );
            None
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ChartError::Other(format!("Chart computation task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orbis_cache::InMemoryCache;
    use orbis_calc::ChartAssembler;
    use orbis_core::HouseSystem;
    use orbis_ephemeris::AnalyticEphemeris;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingEngine {
        inner: ChartAssembler,
        natal_calls: AtomicUsize,
        daily_calls: AtomicUsize,
    }

    impl CountingEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: ChartAssembler::new(Arc::new(AnalyticEphemeris::new())),
                natal_calls: AtomicUsize::new(0),
                daily_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.natal_calls.load(Ordering::SeqCst),
                self.daily_calls.load(Ordering::SeqCst),
            )
        }
    }

    impl ChartEngine for CountingEngine {
        fn natal(&self, request: &ChartRequest) -> Result<NatalBundle> {
            self.natal_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.natal(request)
        }

        fn daily(
            &self,
            request: &ChartRequest,
            natal: &NatalBundle,
            reference: &CivilInstant,
        ) -> Result<DailyBundle> {
            self.daily_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.daily(request, natal, reference)
        }
    }

    #[derive(Debug)]
    struct OfflineStore;

    #[async_trait]
    impl ChartStore for OfflineStore {
        async fn get(&self, _: CacheCategory, _: &str) -> Result<Option<CacheDocument>> {
            Err(ChartError::Cache("connection refused".to_string()))
        }

        async fn put(&self, _: &CacheDocument) -> Result<()> {
            Err(ChartError::Cache("connection refused".to_string()))
        }

        async fn remove_daily_before(&self, _: NaiveDate) -> Result<usize> {
            Err(ChartError::Cache("connection refused".to_string()))
        }

        async fn clear(&self) -> Result<()> {
            Err(ChartError::Cache("connection refused".to_string()))
        }
    }

    fn request(day: u32) -> ChartRequest {
        ChartRequest::parse("1990-05-17", "08:30", 41.0, 29.0)
            .unwrap()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, day).unwrap())
    }

    #[tokio::test]
    async fn test_full_hit_then_natal_hit() {
        let engine = CountingEngine::new();
        let store = Arc::new(InMemoryCache::new());
        let manager = ChartCacheManager::new(engine.clone()).with_store(store.clone());
        let now = Utc::now();

        let first = manager.get_chart(&request(10), now).await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::Calculated);
        assert_eq!(engine.calls(), (1, 1));
        assert_eq!(store.len(CacheCategory::Natal).await, 1);
        assert_eq!(store.len(CacheCategory::Daily).await, 1);

        let second = manager.get_chart(&request(10), now).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::FullHit);
        assert_eq!(engine.calls(), (1, 1));
        assert_eq!(second.natal_key, first.natal_key);
        assert_eq!(
            second.document.natal.natal_ascendant.sign,
            first.document.natal.natal_ascendant.sign
        );

        let next_day = manager.get_chart(&request(11), now).await.unwrap();
        assert_eq!(next_day.cache_status, CacheStatus::NatalHit);
        assert_eq!(engine.calls(), (1, 2));
        assert_eq!(next_day.natal_key, first.natal_key);
        assert_ne!(next_day.daily_key, first.daily_key);
        assert_eq!(store.len(CacheCategory::Daily).await, 2);
    }

    #[tokio::test]
    async fn test_natal_hit_keeps_cached_settings() {
        let engine = CountingEngine::new();
        let manager = ChartCacheManager::new(engine.clone()).with_store(Arc::new(InMemoryCache::new()));
        let now = Utc::now();

        let first = manager.get_chart(&request(10), now).await.unwrap();
        let cached_system = first.document.natal.birth_info.house_system;
        assert_eq!(cached_system, HouseSystem::Placidus);

        let other = request(11).with_house_system(HouseSystem::WholeSign);
        assert!(cached_settings_differ(&other, &first.document.natal));
        assert!(!cached_settings_differ(&request(11), &first.document.natal));

        let second = manager.get_chart(&other, now).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::NatalHit);
        assert_eq!(second.natal_key, first.natal_key);
        assert_eq!(second.document.natal.birth_info.house_system, cached_system);
        assert_eq!(second.document.natal.natal_houses.house_system, cached_system);
        assert_eq!(engine.calls(), (1, 2));
    }

    #[tokio::test]
    async fn test_offline_store_degrades_to_uncached() {
        let engine = CountingEngine::new();
        let manager = ChartCacheManager::new(engine.clone()).with_store(Arc::new(OfflineStore));

        let response = manager.get_chart(&request(10), Utc::now()).await.unwrap();
        assert_eq!(response.cache_status, CacheStatus::Uncached);
        assert_eq!(engine.calls(), (1, 1));
        assert!(manager.cleanup_stale_daily(NaiveDate::MAX, None).await.is_err());
    }

    #[tokio::test]
    async fn test_without_store() {
        let engine = CountingEngine::new();
        let manager = ChartCacheManager::new(engine.clone());

        for _ in 0..2 {
            let response = manager.get_chart(&request(10), Utc::now()).await.unwrap();
            assert_eq!(response.cache_status, CacheStatus::Uncached);
        }
        assert_eq!(engine.calls(), (2, 2));
        assert_eq!(manager.cleanup_stale_daily(NaiveDate::MAX, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_oversized_documents_are_not_written() {
        let engine = CountingEngine::new();
        let store = Arc::new(InMemoryCache::new());
        let manager = ChartCacheManager::new(engine.clone())
            .with_store(store.clone())
            .with_config(CacheConfig::default().with_max_document_bytes(100));

        let first = manager.get_chart(&request(10), Utc::now()).await.unwrap();
        let second = manager.get_chart(&request(10), Utc::now()).await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::Calculated);
        assert_eq!(second.cache_status, CacheStatus::Calculated);
        assert_eq!(engine.calls(), (2, 2));
        assert_eq!(store.len(CacheCategory::Natal).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_compute_natal_once() {
        let engine = CountingEngine::new();
        let manager = ChartCacheManager::new(engine.clone()).with_store(Arc::new(InMemoryCache::new()));
        let request = request(10);
        let now = Utc::now();

        let (a, b) = tokio::join!(manager.get_chart(&request, now), manager.get_chart(&request, now));
        let mut statuses = [a.unwrap().cache_status, b.unwrap().cache_status];
        statuses.sort_by_key(|s| s.as_str());

        assert_eq!(statuses, [CacheStatus::Calculated, CacheStatus::FullHit]);
        assert_eq!(engine.calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_cleanup_stale_daily() {
        let engine = CountingEngine::new();
        let store = Arc::new(InMemoryCache::new());
        let manager = ChartCacheManager::new(engine).with_store(store.clone());
        for day in [1, 2, 10] {
            manager.get_chart(&request(day), Utc::now()).await.unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(manager.cleanup_stale_daily(today, Some(7)).await.unwrap(), 2);
        assert_eq!(store.len(CacheCategory::Daily).await, 1);
        assert_eq!(store.len(CacheCategory::Natal).await, 1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(CacheStatus::NatalHit.to_string(), "natal_hit");
        assert_eq!(
            serde_json::to_string(&CacheStatus::FullHit).unwrap(),
            "\"full_hit\""
        );
    }
}
