//! Aspect matching between two point sets.

use std::collections::BTreeMap;
use std::fmt;

use orbis_core::{ChartPoint, round_to, separation};
use serde::{Deserialize, Serialize};

/// Angular relationship types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    /// 0°.
    Conjunction,
    /// 180°.
    Opposition,
    /// 120°.
    Trine,
    /// 90°.
    Square,
    /// 60°.
    Sextile,
    /// 150°.
    Quincunx,
    /// 30°.
    Semisextile,
    /// 45°.
    Semisquare,
    /// 135°.
    Sesquiquadrate,
}

impl AspectKind {
    /// Every aspect type.
    pub const ALL: [Self; 9] = [
        Self::Conjunction,
        Self::Opposition,
        Self::Trine,
        Self::Square,
        Self::Sextile,
        Self::Quincunx,
        Self::Semisextile,
        Self::Semisquare,
        Self::Sesquiquadrate,
    ];

    /// Ideal separation in degrees.
    #[must_use]
    pub const fn angle(self) -> f64 {
        match self {
            Self::Conjunction => 0.0,
            Self::Opposition => 180.0,
            Self::Trine => 120.0,
            Self::Square => 90.0,
            Self::Sextile => 60.0,
            Self::Quincunx => 150.0,
            Self::Semisextile => 30.0,
            Self::Semisquare => 45.0,
            Self::Sesquiquadrate => 135.0,
        }
    }

    /// Orb used when none is configured.
    #[must_use]
    pub const fn default_orb(self) -> f64 {
        match self {
            Self::Conjunction | Self::Opposition | Self::Trine | Self::Square => 8.0,
            Self::Sextile => 6.0,
            Self::Quincunx | Self::Semisquare | Self::Sesquiquadrate => 2.0,
            Self::Semisextile => 1.0,
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Maximum orb per aspect type. A type with orb 0 is never matched.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbTable {
    orbs: BTreeMap<AspectKind, f64>,
}

impl Default for OrbTable {
    fn default() -> Self {
        Self {
            orbs: AspectKind::ALL
                .into_iter()
                .map(|k| (k, k.default_orb()))
                .collect(),
        }
    }
}

impl OrbTable {
    /// Table with every orb set to zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            orbs: AspectKind::ALL.into_iter().map(|k| (k, 0.0)).collect(),
        }
    }

    /// Sets the orb of one aspect type.
    #[must_use]
    pub fn with_orb(mut self, kind: AspectKind, orb: f64) -> Self {
        self.orbs.insert(kind, orb.max(0.0));
        self
    }

    /// Configured orb of an aspect type.
    #[must_use]
    pub fn orb(&self, kind: AspectKind) -> f64 {
        self.orbs.get(&kind).copied().unwrap_or(0.0)
    }

    fn active(&self) -> impl Iterator<Item = (AspectKind, f64)> + '_ {
        self.orbs
            .iter()
            .filter(|(_, orb)| **orb > 0.0)
            .map(|(k, orb)| (*k, *orb))
    }
}

/// A matched aspect between two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    /// First point.
    pub planet1: ChartPoint,
    /// Second point.
    pub planet2: ChartPoint,
    /// Matched type.
    pub aspect_type: AspectKind,
    /// Distance from the ideal angle, two decimals.
    pub orb: f64,
    /// Shortest separation, `[0, 180]`, two decimals.
    pub exact_difference_0_180: f64,
}

/// Best-fitting aspect type for a pair of longitudes, with its orb.
#[must_use]
pub fn match_aspect(lon1: f64, lon2: f64, orbs: &OrbTable) -> Option<(AspectKind, f64, f64)> {
    let diff = separation(lon1, lon2);
    let mut best: Option<(AspectKind, f64)> = None;
    for (kind, max_orb) in orbs.active() {
        let orb = match kind {
            AspectKind::Conjunction => diff,
            AspectKind::Opposition => (180.0 - diff).abs(),
            other => (diff - other.angle()).abs(),
        };
        if orb <= max_orb && best.is_none_or(|(_, b)| orb < b) {
            best = Some((kind, orb));
        }
    }
    best.map(|(kind, orb)| (kind, orb, diff))
}

/// Finds aspects between two point sets.
///
/// With `others` set to `None` the set is compared against itself, each
/// unordered pair once. The result is sorted by ascending orb.
#[must_use]
pub fn find_aspects(
    points: &[(ChartPoint, f64)],
    others: Option<&[(ChartPoint, f64)]>,
    orbs: &OrbTable,
) -> Vec<Aspect> {
    let mut aspects = Vec::new();
    let mut push = |(p1, lon1): (ChartPoint, f64), (p2, lon2): (ChartPoint, f64)| {
        if let Some((kind, orb, diff)) = match_aspect(lon1, lon2, orbs) {
            aspects.push(Aspect {
                planet1: p1,
                planet2: p2,
                aspect_type: kind,
                orb: round_to(orb, 2),
                exact_difference_0_180: round_to(diff, 2),
            });
        }
    };

    match others {
        None => {
            for (i, a) in points.iter().enumerate() {
                for b in &points[i + 1..] {
                    if a.0 != b.0 {
                        push(*a, *b);
                    }
                }
            }
        }
        Some(others) => {
            for a in points {
                for b in others {
                    push(*a, *b);
                }
            }
        }
    }

    aspects.sort_by(|a, b| a.orb.total_cmp(&b.orb));
    aspects
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{Angle, Body};

    fn point(body: Body, lon: f64) -> (ChartPoint, f64) {
        (ChartPoint::Body(body), lon)
    }

    #[test]
    fn test_conjunction_across_zero() {
        let (kind, orb, diff) = match_aspect(359.0, 2.0, &OrbTable::default()).unwrap();
        assert_eq!(kind, AspectKind::Conjunction);
        assert!((orb - 3.0).abs() < 1e-9);
        assert!((diff - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposition_orb() {
        let (kind, orb, _) = match_aspect(10.0, 185.5, &OrbTable::default()).unwrap();
        assert_eq!(kind, AspectKind::Opposition);
        assert!((orb - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_smallest_orb_wins() {
        // 52° is 7° from the sextile's 60° (over its 6° orb) and 7° from the
        // semisquare's 45° (over its 2° orb): nothing matches.
        assert!(match_aspect(0.0, 52.0, &OrbTable::default()).is_none());
        // With wider orbs both match at 49° and the semisquare is closer.
        let wide = OrbTable::default()
            .with_orb(AspectKind::Semisquare, 8.0)
            .with_orb(AspectKind::Sextile, 20.0);
        let (kind, orb, _) = match_aspect(0.0, 49.0, &wide).unwrap();
        assert_eq!(kind, AspectKind::Semisquare);
        assert!((orb - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_orb_disables_type() {
        let orbs = OrbTable::default().with_orb(AspectKind::Conjunction, 0.0);
        assert!(match_aspect(100.0, 100.5, &orbs).is_none());
        assert!(match_aspect(100.0, 100.5, &OrbTable::empty()).is_none());
    }

    #[test]
    fn test_self_comparison_pairs_once_and_sorted() {
        let points = vec![
            point(Body::Sun, 10.0),
            point(Body::Moon, 100.5),
            point(Body::Mars, 12.0),
            (ChartPoint::Angle(Angle::Ascendant), 195.0),
        ];
        let orbs = OrbTable::default();
        let aspects = find_aspects(&points, None, &orbs);

        assert!(aspects.windows(2).all(|w| w[0].orb <= w[1].orb));
        assert!(aspects.iter().all(|a| a.orb <= orbs.orb(a.aspect_type)));
        assert!(aspects.iter().all(|a| a.planet1 != a.planet2));
        let sun_mars = aspects
            .iter()
            .filter(|a| {
                let pair = [a.planet1, a.planet2];
                pair.contains(&Body::Sun.into()) && pair.contains(&Body::Mars.into())
            })
            .count();
        assert_eq!(sun_mars, 1);
        assert_eq!(aspects[0].aspect_type, AspectKind::Square);
        assert_eq!(aspects[0].orb, 0.5);
    }

    #[test]
    fn test_cross_comparison_includes_same_body() {
        let transit = vec![point(Body::Sun, 120.2)];
        let natal = vec![point(Body::Sun, 120.0), point(Body::Moon, 0.5)];
        let aspects = find_aspects(&transit, Some(&natal), &OrbTable::default());
        assert_eq!(aspects.len(), 2);
        assert_eq!(aspects[0].aspect_type, AspectKind::Conjunction);
        assert_eq!(aspects[1].aspect_type, AspectKind::Trine);
    }
}
