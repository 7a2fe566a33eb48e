#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/orbis-astro/orbis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Analytic ephemeris provider and data-file bootstrap.
//!
//! - [`AnalyticEphemeris`] - Implements [`EphemerisProvider`](orbis_core::EphemerisProvider)
//! - [`OrbitalElements`] - Keplerian orbit for bodies without a built-in theory
//! - [`EphemerisFiles`] - Idempotent download of ephemeris data files
//! - [`EphemerisConfig`] - Data directory, remote location and timeout
//!
//! # Example
//!
//! ```
//! use orbis_core::{Body, EphemerisProvider};
//! use orbis_ephemeris::AnalyticEphemeris;
//!
//! let provider = AnalyticEphemeris::new();
//! let sun = provider.position(2_451_545.0, Body::Sun).unwrap();
//! assert!(sun.longitude > 280.0 && sun.longitude < 281.0);
//! ```

mod eclipse;
mod frames;
mod houses;
mod moon;
mod stars;
mod sun;

/// The analytic provider.
pub mod analytic;
/// Ephemeris file bootstrap.
pub mod bootstrap;
/// Data-file configuration.
pub mod config;
/// Keplerian orbital elements.
pub mod planets;

pub use analytic::AnalyticEphemeris;
pub use bootstrap::{BootstrapReport, EphemerisFiles, FileOutcome, FileStatus};
pub use config::EphemerisConfig;
pub use planets::OrbitalElements;
