//! Secondary progressions and solar arc directions.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use orbis_core::{
    Body, ChartError, CivilInstant, EphemerisProvider, GeoLocation, HouseCuspSet, HouseSystem,
    Result, Section, ZodiacPlacement, ZodiacSign, normalize_degrees, round_to, signed_delta,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aspects::{Aspect, OrbTable, find_aspects};
use crate::metrics::lunation::{ProgressedMoonPhase, progressed_moon_phase};
use crate::positions::{PositionSet, aspect_points, calculate_houses, calculate_positions};

/// Progressed chart for a target date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecondaryProgression {
    /// Julian day the progressed chart is cast for.
    pub progressed_jd: f64,
    /// Progressed positions.
    pub positions: PositionSet,
    /// Progressed houses at the natal location.
    pub houses: HouseCuspSet,
    /// Aspects among progressed positions.
    pub aspects: Vec<Aspect>,
    /// Progressed lunar phase.
    pub moon_phase: Section<ProgressedMoonPhase>,
}

/// A natal body moved by the solar arc.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarArcPosition {
    /// Directed longitude, two decimals.
    pub degree: f64,
    /// Sign.
    pub sign: ZodiacSign,
    /// Offset within the sign.
    pub degree_in_sign: f64,
    /// Arc added to the natal longitude.
    pub solar_arc_applied: f64,
}

/// Julian day of the progressed chart: the natal Julian day plus the whole
/// civil days elapsed between birth and `target`.
///
/// Time of day is ignored on both ends.
#[must_use]
pub fn progressed_jd(birth: &CivilInstant, target: NaiveDate) -> f64 {
    let elapsed = target.signed_duration_since(birth.date).num_days();
    birth.julian_day() + elapsed as f64
}

/// Casts the progressed chart for `target` at the natal location.
pub fn secondary_progression(
    provider: &dyn EphemerisProvider,
    birth: &CivilInstant,
    location: &GeoLocation,
    system: HouseSystem,
    target: NaiveDate,
    orbs: &OrbTable,
) -> SecondaryProgression {
    let jd = progressed_jd(birth, target);
    debug!(jd, target = %target, "Casting secondary progression");
    let houses = calculate_houses(provider, jd, location, system);
    let positions = calculate_positions(provider, jd, &houses, &Body::TRANSIT_SET);
    let aspects = find_aspects(&aspect_points(&[&positions], None), None, orbs);
    let moon_phase = progressed_moon_phase(&positions).into();
    SecondaryProgression {
        progressed_jd: jd,
        positions,
        houses,
        aspects,
        moon_phase,
    }
}

/// Directs every valid natal body by the arc between progressed and natal Sun.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] when either Sun is missing.
pub fn solar_arc(natal: &PositionSet, progressed: &PositionSet) -> Result<BTreeMap<Body, SolarArcPosition>> {
    let sun = |set: &PositionSet, label: &str| {
        set.get(&Body::Sun)
            .filter(|p| p.is_valid())
            .map(|p| p.degree)
            .ok_or_else(|| ChartError::InvalidInput(format!("{label} Sun position missing")))
    };
    let arc = signed_delta(sun(natal, "Natal")?, sun(progressed, "Progressed")?);

    Ok(natal
        .values()
        .filter(|p| p.is_valid())
        .map(|p| {
            let lon = normalize_degrees(p.degree + arc);
            let placement = ZodiacPlacement::from_longitude(lon);
            (
                p.body,
                SolarArcPosition {
                    degree: round_to(lon, 2),
                    sign: placement.sign,
                    degree_in_sign: round_to(placement.degree_in_sign, 2),
                    solar_arc_applied: round_to(arc, 4),
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_positions;
    use chrono::NaiveTime;
    use orbis_core::time::offset_from_minutes;
    use orbis_ephemeris::AnalyticEphemeris;

    fn birth() -> CivilInstant {
        CivilInstant::new(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            offset_from_minutes(180).unwrap(),
        )
    }

    #[test]
    fn test_progressed_jd_adds_elapsed_civil_days() {
        let b = birth();
        let target = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(progressed_jd(&b, target) - b.julian_day(), 10_958.0);
        assert_eq!(progressed_jd(&b, b.date), b.julian_day());

        // Earlier targets move backwards.
        let before = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(progressed_jd(&b, before) - b.julian_day(), -1.0);
    }

    #[test]
    fn test_progression_is_cast_at_the_shifted_instant() {
        let provider = AnalyticEphemeris::new();
        let location = GeoLocation::new(41.0, 29.0).unwrap();
        let b = birth();
        let target = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let progression = secondary_progression(
            &provider,
            &b,
            &location,
            HouseSystem::Placidus,
            target,
            &OrbTable::default(),
        );
        assert!(progression.houses.is_valid());
        assert_eq!(progression.positions.len(), Body::TRANSIT_SET.len());
        assert!(progression.moon_phase.ready().is_some());

        // 2000-01-01 to 2020-01-01 spans 7305 civil days.
        let jd = b.julian_day() + 7305.0;
        assert_eq!(progression.progressed_jd, jd);
        let sun = provider.position(jd, Body::Sun).unwrap().longitude;
        let progressed_sun = progression.positions[&Body::Sun].degree;
        assert!(signed_delta(sun, progressed_sun).abs() < 1e-3);
    }

    #[test]
    fn test_solar_arc_moves_every_body_equally() {
        let natal = test_positions(&[(Body::Sun, 280.0), (Body::Moon, 355.0)]);
        let progressed = test_positions(&[(Body::Sun, 310.5)]);
        let directed = solar_arc(&natal, &progressed).unwrap();
        assert_eq!(directed[&Body::Sun].degree, 310.5);
        assert_eq!(directed[&Body::Moon].degree, 25.5);
        assert_eq!(directed[&Body::Moon].sign, ZodiacSign::Aries);
        assert_eq!(directed[&Body::Moon].solar_arc_applied, 30.5);

        assert!(solar_arc(&natal, &PositionSet::new()).is_err());
    }
}
