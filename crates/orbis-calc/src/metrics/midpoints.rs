//! Midpoints and the bodies that aspect them.

use std::collections::BTreeMap;

use orbis_core::{Body, ZodiacPlacement, ZodiacSign, normalize_degrees, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::{PositionSet, valid_points};

/// Hard aspects checked against a midpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MidpointAspect {
    /// 0° or 180°.
    #[serde(rename = "Conjunction/Opposition")]
    ConjunctionOpposition,
    /// 90°.
    Square,
    /// 45°.
    Semisquare,
    /// 135°.
    Sesquiquadrate,
}

impl MidpointAspect {
    /// Significance weight.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::ConjunctionOpposition => 5,
            Self::Square => 4,
            Self::Sesquiquadrate => 3,
            Self::Semisquare => 2,
        }
    }
}

/// A body aspecting a midpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MidpointHit {
    /// The aspecting body.
    pub celestial_body: Body,
    /// Aspect to the midpoint.
    pub aspect_type: MidpointAspect,
    /// Weight of the aspect type.
    pub weight: u8,
    /// Distance from exact, two decimals.
    pub orb: f64,
}

/// A midpoint with at least one significant hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Midpoint {
    /// Midpoint longitude.
    pub degree: f64,
    /// Its sign.
    pub sign: ZodiacSign,
    /// Offset within the sign.
    pub degree_in_sign: f64,
    /// Hits sorted by orb.
    pub aspects: Vec<MidpointHit>,
}

/// Midpoint of two longitudes on the shorter arc.
#[must_use]
pub fn midpoint(a: f64, b: f64) -> f64 {
    let (a, b) = (normalize_degrees(a), normalize_degrees(b));
    if (a - b).abs() > 180.0 {
        normalize_degrees((a + b + 360.0) / 2.0)
    } else {
        normalize_degrees((a + b) / 2.0)
    }
}

fn classify(midpoint: f64, lon: f64, orb: f64) -> Option<(MidpointAspect, f64)> {
    let diff = (midpoint - lon).abs() % 180.0;
    let conj = diff.min((diff - 180.0).abs());
    if conj <= orb {
        return Some((MidpointAspect::ConjunctionOpposition, conj));
    }
    [
        (MidpointAspect::Square, 90.0),
        (MidpointAspect::Semisquare, 45.0),
        (MidpointAspect::Sesquiquadrate, 135.0),
    ]
    .into_iter()
    .map(|(kind, angle)| (kind, (diff - angle).abs()))
    .find(|(_, distance)| *distance <= orb)
}

fn is_significant(hit: &MidpointHit) -> bool {
    hit.weight >= 4 || (hit.weight == 3 && hit.orb <= 0.7)
}

/// Midpoints of every pair of valid bodies that another body aspects, keyed `A/B`.
#[must_use]
pub fn midpoint_analysis(positions: &PositionSet, orb: f64) -> BTreeMap<String, Midpoint> {
    let points: Vec<(Body, f64)> = valid_points(positions).collect();
    let mut results = BTreeMap::new();

    for (i, &(a, lon_a)) in points.iter().enumerate() {
        for &(b, lon_b) in &points[i + 1..] {
            let mid = midpoint(lon_a, lon_b);
            let mut hits: Vec<MidpointHit> = points
                .iter()
                .filter(|(c, _)| *c != a && *c != b)
                .filter_map(|&(c, lon_c)| {
                    let (kind, distance) = classify(mid, lon_c, orb)?;
                    Some(MidpointHit {
                        celestial_body: c,
                        aspect_type: kind,
                        weight: kind.weight(),
                        orb: round_to(distance, 2),
                    })
                })
                .filter(is_significant)
                .collect();
            if hits.is_empty() {
                continue;
            }
            hits.sort_by(|x, y| x.orb.total_cmp(&y.orb));
            let placement = ZodiacPlacement::from_longitude(mid);
            results.insert(
                format!("{a}/{b}"),
                Midpoint {
                    degree: round_to(mid, 2),
                    sign: placement.sign,
                    degree_in_sign: round_to(placement.degree_in_sign, 2),
                    aspects: hits,
                },
            );
        }
    }
    results
}
