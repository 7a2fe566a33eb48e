//! Explicit initialization context.

use std::sync::Arc;

use orbis_calc::{ChartAssembler, ChartConfig};
use orbis_core::{ChartStore, EphemerisProvider, Result};
use orbis_ephemeris::{AnalyticEphemeris, BootstrapReport, EphemerisConfig, EphemerisFiles};
use tracing::{info, warn};

use crate::manager::ChartCacheManager;

/// Cache behavior of a [`ChartCacheManager`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Documents larger than this are computed but not written.
    pub max_document_bytes: usize,
    /// Daily documents older than this many days are stale.
    pub daily_retention_days: u32,
    /// Collapse concurrent computations of the same birth within the process.
    pub advisory_locks: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 1_000_000,
            daily_retention_days: 7,
            advisory_locks: true,
        }
    }
}

impl CacheConfig {
    /// Sets the per-document byte cap.
    #[must_use]
    pub const fn with_max_document_bytes(mut self, bytes: usize) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Sets the daily retention window.
    #[must_use]
    pub const fn with_daily_retention_days(mut self, days: u32) -> Self {
        self.daily_retention_days = days;
        self
    }

    /// Enables or disables the per-key advisory lock.
    #[must_use]
    pub const fn with_advisory_locks(mut self, enabled: bool) -> Self {
        self.advisory_locks = enabled;
        self
    }
}

/// Everything a chart computation needs, gathered in one value.
///
/// Nothing is configured at import time: the provider, settings and store are
/// chosen here and handed to [`ChartAssembler`] and [`ChartCacheManager`].
/// Without a store, every request is computed and reported as uncached.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use orbis::{InMemoryCache, OrbisContext};
///
/// let context = OrbisContext::default().with_store(Arc::new(InMemoryCache::new()));
/// let manager = context.manager();
/// ```
#[derive(Clone)]
pub struct OrbisContext {
    provider: Arc<dyn EphemerisProvider>,
    chart: ChartConfig,
    ephemeris: EphemerisConfig,
    cache: CacheConfig,
    store: Option<Arc<dyn ChartStore>>,
}

impl std::fmt::Debug for OrbisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrbisContext")
            .field("provider", &self.provider.name())
            .field("chart", &self.chart)
            .field("ephemeris", &self.ephemeris)
            .field("cache", &self.cache)
            .field("store", &self.store.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl Default for OrbisContext {
    fn default() -> Self {
        Self::new(Arc::new(AnalyticEphemeris::new()))
    }
}

impl OrbisContext {
    /// Creates a context around a provider with default settings and no store.
    #[must_use]
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        Self {
            provider,
            chart: ChartConfig::default(),
            ephemeris: EphemerisConfig::default(),
            cache: CacheConfig::default(),
            store: None,
        }
    }

    /// Creates a context with the analytic provider and the ephemeris
    /// directory taken from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_ephemeris_config(EphemerisConfig::from_env())
    }

    /// Replaces the calculation settings.
    #[must_use]
    pub fn with_chart_config(mut self, config: ChartConfig) -> Self {
        self.chart = config;
        self
    }

    /// Replaces the data-file settings.
    #[must_use]
    pub fn with_ephemeris_config(mut self, config: EphemerisConfig) -> Self {
        self.ephemeris = config;
        self
    }

    /// Replaces the cache settings.
    #[must_use]
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Sets the chart store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ChartStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The calculation settings.
    #[must_use]
    pub const fn chart_config(&self) -> &ChartConfig {
        &self.chart
    }

    /// The data-file settings.
    #[must_use]
    pub const fn ephemeris_config(&self) -> &EphemerisConfig {
        &self.ephemeris
    }

    /// The cache settings.
    #[must_use]
    pub const fn cache_config(&self) -> &CacheConfig {
        &self.cache
    }

    /// Makes sure the configured data files are present.
    ///
    /// Safe to call repeatedly and concurrently. Missing files are reported,
    /// not raised, and charts can still be computed afterwards.
    ///
    /// # Errors
    /// Returns an error only if the HTTP client cannot be built.
    pub async fn bootstrap_ephemeris(&self) -> Result<BootstrapReport> {
        let files = EphemerisFiles::new(self.ephemeris.clone())?;
        let report = files.ensure_all().await;
        if report.is_complete() {
            info!(
                dir = %self.ephemeris.data_dir.display(),
                files = report.files.len(),
                "Ephemeris files ready"
            );
        } else {
            warn!(
                dir = %self.ephemeris.data_dir.display(),
                "Some ephemeris files are unavailable"
            );
        }
        Ok(report)
    }

    /// An uncached assembler using this context's provider and settings.
    #[must_use]
    pub fn assembler(&self) -> ChartAssembler {
        ChartAssembler::new(Arc::clone(&self.provider)).with_config(self.chart.clone())
    }

    /// A cache manager around [`Self::assembler`] and the configured store.
    #[must_use]
    pub fn manager(&self) -> ChartCacheManager {
        let manager = ChartCacheManager::new(Arc::new(self.assembler()))
            .with_offset_policy(self.chart.offset_policy)
            .with_config(self.cache.clone());
        match &self.store {
            Some(store) => manager.with_store(Arc::clone(store)),
            None => manager,
        }
    }
}
