#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/orbis-astro/orbis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for astronomical chart computation.
//!
//! This crate provides the foundational abstractions shared by every orbis crate:
//!
//! - [`Body`](body::Body) - Closed catalog of bodies and calculated points
//! - [`EphemerisProvider`](provider::EphemerisProvider) - Raw position, house and eclipse source
//! - [`ChartStore`](cache::ChartStore) - Two-tier chart cache abstraction
//! - [`ZodiacPlacement`](zodiac::ZodiacPlacement) - Position normalizer
//! - [`CivilInstant`](time::CivilInstant) - Local time to Julian day conversion

/// Body and chart-angle catalog.
pub mod body;
/// Cache documents, content-hash keys and the store trait.
pub mod cache;
/// Error types for chart operations.
pub mod error;
/// House lookup against a cusp set.
pub mod houses;
/// Ephemeris provider trait.
pub mod provider;
/// Civil time and Julian day conversion.
pub mod time;
/// Core data types (positions, cusps, eclipses, sections).
pub mod types;
/// Zodiac normalization and angle arithmetic.
pub mod zodiac;

// Re-export commonly used items at crate root
pub use body::{Angle, Body, ChartPoint};
pub use cache::{BirthFingerprint, CacheCategory, CacheDocument, ChartStore, daily_key};
pub use error::{ChartError, Result};
pub use houses::locate_house;
pub use provider::EphemerisProvider;
pub use time::CivilInstant;
pub use types::{
    CelestialPosition, ChartAngles, EclipseClass, EclipseEvent, EclipseKind, FixedStarPosition,
    GeoLocation, HouseCuspSet, HouseSystem, RawPosition, Section,
};
pub use zodiac::{
    Element, Modality, Polarity, ZodiacPlacement, ZodiacSign, normalize_degrees, round_to,
    separation, signed_delta,
};
