//! The built-in analytic ephemeris provider.

use std::collections::HashMap;

use orbis_core::{
    Body, ChartError, EclipseEvent, EclipseKind, EphemerisProvider, FixedStarPosition,
    GeoLocation, HouseCuspSet, HouseSystem, RawPosition, Result, normalize_degrees, signed_delta,
};
use tracing::{instrument, trace};

use crate::frames::{self, centuries, nutation, to_tt};
use crate::planets::{self, OrbitalElements};
use crate::{eclipse, houses, moon, stars, sun};

/// Half-width of the central difference used for speeds, in days.
const SPEED_STEP_DAYS: f64 = 0.05;

/// Provider built on closed-form solar, lunar and planetary theories.
///
/// Bodies without a built-in theory answer [`ChartError::NotSupported`]
/// unless an orbit has been registered with [`AnalyticEphemeris::with_orbit`].
#[derive(Debug, Clone, Default)]
pub struct AnalyticEphemeris {
    orbits: HashMap<Body, OrbitalElements>,
}

impl AnalyticEphemeris {
    /// Creates a provider with the built-in theories only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers heliocentric mean elements for a body without a built-in theory.
    #[must_use]
    pub fn with_orbit(mut self, body: Body, elements: OrbitalElements) -> Self {
        self.orbits.insert(body, elements);
        self
    }

    /// Returns `true` if the provider can compute `body`.
    #[must_use]
    pub fn supports(&self, body: Body) -> bool {
        matches!(
            body,
            Body::Sun | Body::Moon | Body::MeanNode | Body::TrueNode | Body::MeanLilith
        ) || planets::builtin(body).is_some()
            || self.orbits.contains_key(&body)
    }

    /// Apparent longitude, latitude and distance at a TT instant.
    fn ecliptic(&self, jd_tt: f64, body: Body) -> Result<(f64, f64, f64)> {
        let t = centuries(jd_tt);
        let (dpsi, _) = nutation(t);
        let (lon, lat, dist) = match body {
            Body::Sun => {
                let (lon, r) = sun::apparent_position(t);
                return Ok((lon, 0.0, r));
            }
            Body::Moon => moon::geometric_position(t),
            Body::MeanNode => (moon::mean_node(t), 0.0, 0.0),
            Body::TrueNode => (moon::true_node(t), 0.0, 0.0),
            Body::MeanLilith => (moon::mean_apogee(t), 0.0, 0.0),
            other => {
                let orbit = self
                    .orbits
                    .get(&other)
                    .copied()
                    .or_else(|| planets::builtin(other))
                    .ok_or_else(|| {
                        ChartError::NotSupported(format!("No theory or orbit for {other}"))
                    })?;
                planets::geocentric_position(&orbit, t)
            }
        };
        Ok((normalize_degrees(lon + dpsi), lat, dist))
    }
}

impl EphemerisProvider for AnalyticEphemeris {
    fn name(&self) -> &str {
        "analytic"
    }

    #[instrument(level = "trace", skip(self), fields(body = %body))]
    fn position(&self, jd: f64, body: Body) -> Result<RawPosition> {
        if !jd.is_finite() {
            return Err(ChartError::InvalidInput(format!("Invalid Julian day {jd}")));
        }
        let jd_tt = to_tt(jd);
        let (longitude, latitude, distance) = self.ecliptic(jd_tt, body)?;
        let (before, ..) = self.ecliptic(jd_tt - SPEED_STEP_DAYS, body)?;
        let (after, ..) = self.ecliptic(jd_tt + SPEED_STEP_DAYS, body)?;
        let speed = signed_delta(before, after) / (2.0 * SPEED_STEP_DAYS);
        trace!(longitude, speed, "Computed position");
        Ok(RawPosition {
            longitude,
            latitude,
            distance,
            speed,
        })
    }

    #[instrument(level = "debug", skip(self), fields(system = %system))]
    fn houses(&self, jd: f64, location: &GeoLocation, system: HouseSystem) -> Result<HouseCuspSet> {
        if !jd.is_finite() {
            return Err(ChartError::InvalidInput(format!("Invalid Julian day {jd}")));
        }
        let eps = self.obliquity(jd);
        let ramc = self.local_sidereal_time(jd, location.longitude);
        houses::compute(ramc, location.latitude, eps, system)
    }

    fn next_solar_eclipse(&self, jd: f64) -> Result<EclipseEvent> {
        eclipse::next_eclipse(jd, EclipseKind::Solar)
    }

    fn next_lunar_eclipse(&self, jd: f64) -> Result<EclipseEvent> {
        eclipse::next_eclipse(jd, EclipseKind::Lunar)
    }

    fn fixed_star(&self, jd: f64, name: &str) -> Result<FixedStarPosition> {
        stars::position(jd, name)
    }

    fn obliquity(&self, jd: f64) -> f64 {
        frames::true_obliquity(to_tt(jd))
    }

    fn local_sidereal_time(&self, jd: f64, longitude: f64) -> f64 {
        normalize_degrees(frames::apparent_sidereal_time(jd) + longitude)
    }

    fn fixed_star_names(&self) -> Vec<String> {
        stars::names()
    }
}
