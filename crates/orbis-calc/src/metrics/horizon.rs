//! Horizon coordinates with atmospheric refraction.

use std::collections::BTreeMap;

use orbis_core::{Body, GeoLocation, normalize_degrees, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::PositionSet;

/// Standard sea-level pressure, hPa.
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;
/// Standard air temperature, °C.
pub const STANDARD_TEMPERATURE_C: f64 = 15.0;

/// Position of a body relative to the local horizon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizonPosition {
    /// Azimuth from north through east, degrees.
    pub azimuth: f64,
    /// Geometric altitude.
    pub true_altitude: f64,
    /// Altitude including refraction.
    pub apparent_altitude: f64,
    /// `true` when the apparent altitude is positive.
    pub is_above_horizon: bool,
}

/// Refraction in degrees to add to a true altitude (Saemundsson).
///
/// Below −1° the formula no longer applies and no correction is made.
#[must_use]
pub fn refraction(true_altitude: f64, pressure_hpa: f64, temperature_c: f64) -> f64 {
    if true_altitude < -1.0 {
        return 0.0;
    }
    let h = true_altitude;
    let arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();
    let scale = (pressure_hpa / 1010.0) * (283.0 / (273.0 + temperature_c));
    (arcmin * scale / 60.0).max(0.0)
}

/// Converts ecliptic coordinates to azimuth and true altitude.
///
/// `lst` is the local sidereal time in degrees.
#[must_use]
pub fn ecliptic_to_horizon(longitude: f64, latitude: f64, obliquity: f64, lst: f64, geo_lat: f64) -> (f64, f64) {
    let (lon, lat, eps) = (
        longitude.to_radians(),
        latitude.to_radians(),
        obliquity.to_radians(),
    );
    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin())
        .clamp(-1.0, 1.0)
        .asin();
    let hour_angle = lst.to_radians() - ra;
    let phi = geo_lat.to_radians();

    let altitude = (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let azimuth = (-dec.cos() * hour_angle.sin())
        .atan2(dec.sin() * phi.cos() - dec.cos() * hour_angle.cos() * phi.sin());
    (normalize_degrees(azimuth.to_degrees()), altitude.to_degrees())
}

/// Horizon coordinates of every valid body at standard atmosphere.
#[must_use]
pub fn horizon_positions(
    positions: &PositionSet,
    location: &GeoLocation,
    obliquity: f64,
    lst: f64,
) -> BTreeMap<Body, HorizonPosition> {
    positions
        .values()
        .filter(|p| p.is_valid())
        .map(|p| {
            let (azimuth, altitude) =
                ecliptic_to_horizon(p.degree, p.latitude, obliquity, lst, location.latitude);
            let apparent = altitude
                + refraction(altitude, STANDARD_PRESSURE_HPA, STANDARD_TEMPERATURE_C);
            (
                p.body,
                HorizonPosition {
                    azimuth: round_to(azimuth, 2),
                    true_altitude: round_to(altitude, 2),
                    apparent_altitude: round_to(apparent, 2),
                    is_above_horizon: apparent > 0.0,
                },
            )
        })
        .collect()
}
