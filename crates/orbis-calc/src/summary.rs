//! Structural overview of a natal chart.

use std::collections::BTreeMap;

use orbis_core::{Body, Element, HouseCuspSet, Modality, Polarity, ZodiacPlacement, ZodiacSign, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::PositionSet;

/// Sign, degree and decan of the ascendant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AscendantInfo {
    /// Longitude, two decimals.
    pub degree: f64,
    /// Sign.
    pub sign: ZodiacSign,
    /// Offset within the sign.
    pub degree_in_sign: f64,
    /// Decan, 1 to 3.
    pub decan: u8,
}

impl AscendantInfo {
    /// Describes the ascendant of a cusp set.
    #[must_use]
    pub fn from_houses(houses: &HouseCuspSet) -> Self {
        let asc = houses.angles.ascendant;
        let placement = ZodiacPlacement::from_longitude(asc);
        Self {
            degree: round_to(asc, 2),
            sign: placement.sign,
            degree_in_sign: round_to(placement.degree_in_sign, 2),
            decan: placement.decan,
        }
    }
}

/// Sign and house of a luminary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LuminaryInfo {
    /// Sign.
    pub sign: ZodiacSign,
    /// House.
    pub house: u8,
}

/// Tallies and placements summarizing a natal chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NatalSummary {
    /// Ascendant.
    pub ascendant: AscendantInfo,
    /// The Sun, when it computed.
    pub sun: Option<LuminaryInfo>,
    /// The Moon, when it computed.
    pub moon: Option<LuminaryInfo>,
    /// Planets per element.
    pub elements: BTreeMap<Element, usize>,
    /// Planets per modality.
    pub modalities: BTreeMap<Modality, usize>,
    /// Planets per polarity.
    pub polarities: BTreeMap<Polarity, usize>,
    /// Element with the most planets.
    pub dominant_element: Option<Element>,
    /// Modality with the most planets.
    pub dominant_modality: Option<Modality>,
    /// Polarity with the most planets.
    pub dominant_polarity: Option<Polarity>,
    /// Retrograde planets and points.
    pub retrogrades: Vec<Body>,
    /// Bodies per occupied house.
    pub occupied_houses: BTreeMap<u8, Vec<Body>>,
}

/// First key with the highest count.
fn dominant<K: Copy + Ord>(tally: &BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (&key, &count) in tally {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

/// Summarizes planets and additional points.
#[must_use]
pub fn natal_summary(planets: &PositionSet, points: &PositionSet, houses: &HouseCuspSet) -> NatalSummary {
    let luminary = |body: Body| {
        planets
            .get(&body)
            .filter(|p| p.is_valid())
            .map(|p| LuminaryInfo {
                sign: p.sign,
                house: p.house,
            })
    };

    let mut elements = BTreeMap::new();
    let mut modalities = BTreeMap::new();
    let mut polarities = BTreeMap::new();
    for p in planets.values().filter(|p| p.is_valid()) {
        *elements.entry(p.sign.element()).or_insert(0) += 1;
        *modalities.entry(p.sign.modality()).or_insert(0) += 1;
        *polarities.entry(p.sign.polarity()).or_insert(0) += 1;
    }

    let mut retrogrades = Vec::new();
    let mut occupied_houses: BTreeMap<u8, Vec<Body>> = BTreeMap::new();
    for p in planets.values().chain(points.values()).filter(|p| p.is_valid()) {
        if p.retrograde {
            retrogrades.push(p.body);
        }
        if p.house > 0 {
            occupied_houses.entry(p.house).or_default().push(p.body);
        }
    }

    NatalSummary {
        ascendant: AscendantInfo::from_houses(houses),
        sun: luminary(Body::Sun),
        moon: luminary(Body::Moon),
        dominant_element: dominant(&elements),
        dominant_modality: dominant(&modalities),
        dominant_polarity: dominant(&polarities),
        elements,
        modalities,
        polarities,
        retrogrades,
        occupied_houses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_positions;
    use orbis_core::HouseSystem;

    #[test]
    fn test_tallies_and_dominants() {
        // Aries, Leo, Sagittarius, Taurus: fire dominates.
        let planets = test_positions(&[
            (Body::Sun, 5.0),
            (Body::Moon, 125.0),
            (Body::Mars, 245.0),
            (Body::Venus, 35.0),
        ]);
        let mut points = test_positions(&[(Body::MeanNode, 200.0)]);
        if let Some(node) = points.get_mut(&Body::MeanNode) {
            node.retrograde = true;
        }
        let houses = HouseCuspSet::failed(HouseSystem::Placidus, "none");

        let summary = natal_summary(&planets, &points, &houses);
        assert_eq!(summary.elements[&Element::Fire], 3);
        assert_eq!(summary.dominant_element, Some(Element::Fire));
        assert_eq!(summary.dominant_polarity, Some(Polarity::Positive));
        assert_eq!(summary.sun.as_ref().map(|s| s.sign), Some(ZodiacSign::Aries));
        assert_eq!(summary.retrogrades, vec![Body::MeanNode]);
        assert_eq!(summary.occupied_houses[&1].len(), 5);
        assert_eq!(summary.ascendant.sign, ZodiacSign::Aries);
    }

    #[test]
    fn test_dominant_tie_takes_first() {
        let tally = BTreeMap::from([(Modality::Cardinal, 2), (Modality::Fixed, 2)]);
        assert_eq!(dominant(&tally), Some(Modality::Cardinal));
        assert_eq!(dominant::<Modality>(&BTreeMap::new()), None);
    }
}
