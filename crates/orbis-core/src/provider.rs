//! The ephemeris provider seam.
//!
//! Everything above this trait treats raw positions, house cusps and eclipse
//! instants as a black box. Calls are in-process and CPU-bound, so the trait
//! is synchronous.

use std::fmt::Debug;

use crate::{
    body::Body,
    error::Result,
    types::{EclipseEvent, FixedStarPosition, GeoLocation, HouseCuspSet, HouseSystem, RawPosition},
};

/// Source of raw ephemeris samples.
///
/// All instants are Julian days in UT.
pub trait EphemerisProvider: Send + Sync + Debug {
    /// Returns the name of this provider.
    fn name(&self) -> &str;

    /// Geocentric ecliptic position and speed of a body.
    fn position(&self, jd: f64, body: Body) -> Result<RawPosition>;

    /// House cusps and angles for a time and place.
    fn houses(&self, jd: f64, location: &GeoLocation, system: HouseSystem) -> Result<HouseCuspSet>;

    /// First solar eclipse whose maximum falls on or after `jd`.
    fn next_solar_eclipse(&self, jd: f64) -> Result<EclipseEvent>;

    /// First lunar eclipse whose maximum falls on or after `jd`.
    fn next_lunar_eclipse(&self, jd: f64) -> Result<EclipseEvent>;

    /// Position of a named fixed star.
    fn fixed_star(&self, jd: f64, name: &str) -> Result<FixedStarPosition>;

    /// True obliquity of the ecliptic at `jd`, degrees.
    fn obliquity(&self, jd: f64) -> f64;

    /// Local apparent sidereal time at `jd` for an east longitude, degrees.
    fn local_sidereal_time(&self, jd: f64, longitude: f64) -> f64;

    /// Names of the fixed stars this provider can locate.
    fn fixed_star_names(&self) -> Vec<String> {
        Vec::new()
    }
}
