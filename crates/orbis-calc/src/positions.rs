//! House cusps and position batches.
//!
//! Both entry points recover from provider failures locally: a failed house
//! computation yields a zeroed cusp set (every body then lands in house 1) and
//! a failed body lookup yields a placeholder entry.

use std::collections::BTreeMap;

use orbis_core::{
    Angle, Body, CelestialPosition, ChartPoint, EphemerisProvider, GeoLocation, HouseCuspSet,
    HouseSystem, locate_house,
};
use tracing::{debug, warn};

/// Positions keyed by body, in catalog order.
pub type PositionSet = BTreeMap<Body, CelestialPosition>;

/// Computes house cusps, falling back to a zeroed set on failure.
pub fn calculate_houses(
    provider: &dyn EphemerisProvider,
    jd: f64,
    location: &GeoLocation,
    system: HouseSystem,
) -> HouseCuspSet {
    match provider.houses(jd, location, system) {
        Ok(set) => set.rounded(),
        Err(e) => {
            warn!(system = %system, error = %e, "House calculation failed, using zeroed cusps");
            HouseCuspSet::failed(system, e.to_string())
        }
    }
}

/// Computes a batch of positions located in `houses`.
///
/// A failed lookup is recorded as a placeholder and never affects the other bodies.
pub fn calculate_positions(
    provider: &dyn EphemerisProvider,
    jd: f64,
    houses: &HouseCuspSet,
    bodies: &[Body],
) -> PositionSet {
    bodies
        .iter()
        .map(|&body| {
            let position = match provider.position(jd, body) {
                Ok(raw) => {
                    let house = locate_house(raw.longitude, &houses.cusps);
                    CelestialPosition::from_raw(body, raw, house)
                }
                Err(e) => {
                    debug!(body = %body, error = %e, "Position lookup failed");
                    CelestialPosition::placeholder(body, e.to_string())
                }
            };
            (body, position)
        })
        .collect()
}

/// Longitudes of the entries that hold real data.
pub fn valid_points(set: &PositionSet) -> impl Iterator<Item = (Body, f64)> + '_ {
    set.values()
        .filter(|p| p.is_valid())
        .map(|p| (p.body, p.degree))
}

/// Aspect endpoints from one or more position sets plus, when the cusps are
/// real, the ascendant, midheaven and vertex.
#[must_use]
pub fn aspect_points(sets: &[&PositionSet], houses: Option<&HouseCuspSet>) -> Vec<(ChartPoint, f64)> {
    let mut points: Vec<(ChartPoint, f64)> = sets
        .iter()
        .flat_map(|set| valid_points(set))
        .map(|(body, lon)| (ChartPoint::Body(body), lon))
        .collect();
    if let Some(houses) = houses.filter(|h| h.is_valid()) {
        let angles = houses.angles;
        points.extend([
            (ChartPoint::Angle(Angle::Ascendant), angles.ascendant),
            (ChartPoint::Angle(Angle::Midheaven), angles.mc),
            (ChartPoint::Angle(Angle::Vertex), angles.vertex),
        ]);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{
        ChartError, EclipseEvent, FixedStarPosition, RawPosition, Result, ZodiacSign,
    };

    /// Answers a fixed longitude per body; Pluto and houses fail.
    #[derive(Debug)]
    struct StubProvider;

    impl EphemerisProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn position(&self, _jd: f64, body: Body) -> Result<RawPosition> {
            if body == Body::Pluto {
                return Err(ChartError::Provider("no data".into()));
            }
            let code = f64::from(body.provider_code());
            Ok(RawPosition {
                longitude: code * 35.0,
                latitude: 0.5,
                distance: 1.0,
                speed: if body == Body::Mercury { -0.3 } else { 1.0 },
            })
        }

        fn houses(&self, _jd: f64, _loc: &GeoLocation, _sys: HouseSystem) -> Result<HouseCuspSet> {
            Err(ChartError::Provider("houses unavailable".into()))
        }

        fn next_solar_eclipse(&self, _jd: f64) -> Result<EclipseEvent> {
            Err(ChartError::NotSupported("eclipses".into()))
        }

        fn next_lunar_eclipse(&self, _jd: f64) -> Result<EclipseEvent> {
            Err(ChartError::NotSupported("eclipses".into()))
        }

        fn fixed_star(&self, _jd: f64, name: &str) -> Result<FixedStarPosition> {
            Err(ChartError::NotSupported(name.to_string()))
        }

        fn obliquity(&self, _jd: f64) -> f64 {
            23.44
        }

        fn local_sidereal_time(&self, _jd: f64, longitude: f64) -> f64 {
            longitude
        }
    }

    #[test]
    fn test_failed_body_is_isolated() {
        let location = GeoLocation::new(41.0, 29.0).unwrap();
        let houses = calculate_houses(&StubProvider, 2_451_545.0, &location, HouseSystem::Placidus);
        assert!(!houses.is_valid());
        assert_eq!(houses.cusps, [0.0; 12]);

        let set = calculate_positions(&StubProvider, 2_451_545.0, &houses, &Body::PLANETS);
        assert_eq!(set.len(), 10);
        let pluto = &set[&Body::Pluto];
        assert!(!pluto.is_valid());
        assert_eq!(pluto.house, 0);
        assert_eq!(pluto.degree, 0.0);

        // Zeroed cusps put every real body in house 1.
        assert!(set.values().filter(|p| p.is_valid()).all(|p| p.house == 1));
        assert_eq!(valid_points(&set).count(), 9);
    }

    #[test]
    fn test_retrograde_follows_speed_sign() {
        let houses = HouseCuspSet::failed(HouseSystem::Equal, "none");
        let set = calculate_positions(&StubProvider, 0.0, &houses, &[Body::Mercury, Body::Venus]);
        assert!(set[&Body::Mercury].retrograde);
        assert!(!set[&Body::Venus].retrograde);
        assert_eq!(set[&Body::Venus].sign, ZodiacSign::Cancer);
    }

    #[test]
    fn test_angles_only_with_real_cusps() {
        let houses = HouseCuspSet::failed(HouseSystem::Placidus, "none");
        let set = calculate_positions(&StubProvider, 0.0, &houses, &[Body::Sun, Body::Pluto]);
        assert_eq!(aspect_points(&[&set], Some(&houses)).len(), 1);

        let real = HouseCuspSet {
            error: None,
            ..houses
        };
        assert_eq!(aspect_points(&[&set], Some(&real)).len(), 4);
    }
}
