//! Equatorial declination.

use std::collections::BTreeMap;

use orbis_core::{Body, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::PositionSet;

/// Declination of one body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Declination {
    /// Declination in degrees, north positive.
    pub declination: f64,
    /// `true` when the body lies beyond the Sun's greatest declination.
    pub out_of_bounds: bool,
}

/// Declination from ecliptic longitude and latitude.
#[must_use]
pub fn declination(longitude: f64, latitude: f64, obliquity: f64) -> f64 {
    let (lon, lat, eps) = (
        longitude.to_radians(),
        latitude.to_radians(),
        obliquity.to_radians(),
    );
    (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin())
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees()
}

/// Declinations of every valid body, with `obliquity` of date.
#[must_use]
pub fn declinations(positions: &PositionSet, obliquity: f64) -> BTreeMap<Body, Declination> {
    positions
        .values()
        .filter(|p| p.is_valid())
        .map(|p| {
            let dec = declination(p.degree, p.latitude, obliquity);
            (
                p.body,
                Declination {
                    declination: round_to(dec, 4),
                    out_of_bounds: dec.abs() > obliquity,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_positions;
    use orbis_core::CelestialPosition;

    #[test]
    fn test_solstice_points() {
        assert!((declination(90.0, 0.0, 23.44) - 23.44).abs() < 1e-9);
        assert!((declination(270.0, 0.0, 23.44) + 23.44).abs() < 1e-9);
        assert!(declination(0.0, 0.0, 23.44).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_needs_latitude() {
        let mut positions = test_positions(&[(Body::Sun, 80.0), (Body::Moon, 90.0)]);
        if let Some(moon) = positions.get_mut(&Body::Moon) {
            moon.latitude = 5.0;
        }
        positions.insert(Body::Ceres, CelestialPosition::placeholder(Body::Ceres, "x"));

        let result = declinations(&positions, 23.44);
        assert_eq!(result.len(), 2);
        assert!(!result[&Body::Sun].out_of_bounds);
        assert!(result[&Body::Moon].out_of_bounds);
        assert!((result[&Body::Moon].declination - 28.44).abs() < 1e-3);
    }
}
