//! Arabic parts.

use std::collections::BTreeMap;

use orbis_core::{
    Body, ChartError, HouseCuspSet, Result, ZodiacPlacement, ZodiacSign, locate_house,
    normalize_degrees, round_to,
};
use serde::{Deserialize, Serialize};

use crate::positions::PositionSet;

/// A calculated sensitive point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArabicPart {
    /// Longitude, two decimals.
    pub degree: f64,
    /// Sign.
    pub sign: ZodiacSign,
    /// Offset within the sign.
    pub degree_in_sign: f64,
    /// House containing the point.
    pub house: u8,
}

/// Local hours counted as a day birth, `[6, 18)`.
#[must_use]
pub fn is_day_hour(hour: u32) -> bool {
    (6..18).contains(&hour)
}

/// Part of Fortune: ASC + Moon − Sun by day, ASC + Sun − Moon by night.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] when the Sun or Moon is missing or the cusps are zeroed.
pub fn part_of_fortune(positions: &PositionSet, houses: &HouseCuspSet, day: bool) -> Result<ArabicPart> {
    if !houses.is_valid() {
        return Err(ChartError::InvalidInput(
            "Ascendant unavailable".to_string(),
        ));
    }
    let longitude = |body: Body| {
        positions
            .get(&body)
            .filter(|p| p.is_valid())
            .map(|p| p.degree)
            .ok_or_else(|| ChartError::InvalidInput(format!("{body} position missing")))
    };
    let (sun, moon) = (longitude(Body::Sun)?, longitude(Body::Moon)?);
    let asc = houses.angles.ascendant;
    let lon = if day {
        normalize_degrees(asc + moon - sun)
    } else {
        normalize_degrees(asc + sun - moon)
    };
    let placement = ZodiacPlacement::from_longitude(lon);
    Ok(ArabicPart {
        degree: round_to(lon, 2),
        sign: placement.sign,
        degree_in_sign: round_to(placement.degree_in_sign, 2),
        house: locate_house(lon, &houses.cusps),
    })
}

/// Every supported part, keyed by name.
///
/// # Errors
/// Fails under the same conditions as [`part_of_fortune`].
pub fn arabic_parts(
    positions: &PositionSet,
    houses: &HouseCuspSet,
    day: bool,
) -> Result<BTreeMap<String, ArabicPart>> {
    let fortune = part_of_fortune(positions, houses, day)?;
    Ok(BTreeMap::from([("Part of Fortune".to_string(), fortune)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_positions;
    use orbis_core::{ChartAngles, HouseSystem};

    fn equal_houses(asc: f64) -> HouseCuspSet {
        let cusps = std::array::from_fn(|i| normalize_degrees(asc + 30.0 * i as f64));
        HouseCuspSet {
            house_system: HouseSystem::Equal,
            cusps,
            angles: ChartAngles {
                ascendant: asc,
                ..ChartAngles::default()
            },
            error: None,
        }
    }

    #[test]
    fn test_day_and_night_formulas() {
        let positions = test_positions(&[(Body::Sun, 100.0), (Body::Moon, 160.0)]);
        let houses = equal_houses(15.0);

        let day = part_of_fortune(&positions, &houses, true).unwrap();
        assert_eq!(day.degree, 75.0);
        assert_eq!(day.sign, ZodiacSign::Gemini);
        assert_eq!(day.house, 3);

        let night = part_of_fortune(&positions, &houses, false).unwrap();
        assert_eq!(night.degree, 315.0);
        assert_eq!(night.house, 11);
    }

    #[test]
    fn test_requires_real_cusps() {
        let positions = test_positions(&[(Body::Sun, 100.0), (Body::Moon, 160.0)]);
        let zeroed = HouseCuspSet::failed(HouseSystem::Placidus, "none");
        assert!(arabic_parts(&positions, &zeroed, true).is_err());
        assert!(is_day_hour(6) && is_day_hour(17));
        assert!(!is_day_hour(18) && !is_day_hour(5));
    }
}
