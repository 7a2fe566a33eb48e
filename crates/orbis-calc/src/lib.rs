#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/orbis-astro/orbis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Chart computation for orbis.
//!
//! - [`ChartAssembler`](assembler::ChartAssembler) - Request to natal and daily bundles
//! - [`positions`] - House cusps and position batches
//! - [`aspects`] - Aspect matching
//! - [`metrics`] - Antiscia, midpoints, dignity and the other derived metrics
//! - [`forecast`] - Progressions, returns, period tables and eclipses

/// Aspect types, orb tables and matching.
pub mod aspects;
/// Chart requests and the chart engine.
pub mod assembler;
/// Natal and daily bundle schema.
pub mod bundle;
/// Calculation settings.
pub mod config;
pub mod forecast;
/// Harmonic charts.
pub mod harmonics;
pub mod metrics;
/// Position batches and house cusps.
pub mod positions;
/// Natal summary.
pub mod summary;

// Re-export commonly used items at crate root
pub use aspects::{Aspect, AspectKind, OrbTable, find_aspects};
pub use assembler::{ChartAssembler, ChartEngine, ChartRequest, ReferenceInstant};
pub use bundle::{BirthInfo, ChartDocument, DailyBundle, NatalBundle, TransitInfo};
pub use config::{ChartConfig, OffsetPolicy};
pub use forecast::RootSolver;
pub use positions::PositionSet;
pub use summary::NatalSummary;
