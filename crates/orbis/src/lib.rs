#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/orbis-astro/orbis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Natal, transit and forecast charts with a two-tier cache.
//!
//! This crate re-exports the core types, the chart assembler, the document
//! stores and the analytic ephemeris, and provides an [`OrbisContext`] for
//! explicit initialization and a [`ChartCacheManager`] that serves charts
//! from a [`ChartStore`].
//!
//! # Features
//!
//! - `cache-sqlite` - SQLite-backed chart store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orbis::{ChartRequest, InMemoryCache, OrbisContext};
//!
//! #[tokio::main]
//! async fn main() -> orbis::Result<()> {
//!     let context = OrbisContext::from_env().with_store(Arc::new(InMemoryCache::new()));
//!     let report = context.bootstrap_ephemeris().await?;
//!     println!("ephemeris complete: {}", report.is_complete());
//!
//!     let request = ChartRequest::parse("1990-05-17", "08:30", 41.0, 29.0)?;
//!     let response = context.manager().get_chart(&request, chrono::Utc::now()).await?;
//!     println!("{} {}", response.cache_status, response.document.natal.natal_ascendant.sign);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use orbis_core::*;

// Calculation
pub use orbis_calc::{
    Aspect, AspectKind, ChartAssembler, ChartConfig, ChartDocument, ChartEngine, ChartRequest,
    DailyBundle, NatalBundle, OffsetPolicy, OrbTable, ReferenceInstant,
};

// Stores
#[cfg(feature = "cache-sqlite")]
pub use orbis_cache::SqliteCache;
pub use orbis_cache::{InMemoryCache, NoopCache};

// Ephemeris
pub use orbis_ephemeris::{AnalyticEphemeris, BootstrapReport, EphemerisConfig};

mod context;
mod manager;
pub use context::{CacheConfig, OrbisContext};
pub use manager::{CacheStatus, ChartCacheManager, ChartResponse};
