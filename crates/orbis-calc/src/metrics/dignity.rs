//! Essential dignity of the classical planets.

use std::collections::BTreeMap;

use orbis_core::{Body, ZodiacSign, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::PositionSet;

/// Dignity classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DignityStatus {
    /// In a sign it rules.
    Ruler,
    /// In its exaltation.
    Exalted,
    /// Opposite a sign it rules.
    Detriment,
    /// Opposite its exaltation.
    Fall,
    /// None of the above.
    Peregrine,
}

/// Dignity of one planet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DignityScore {
    /// Longitude, two decimals.
    pub degree: f64,
    /// Sign occupied.
    pub sign: ZodiacSign,
    /// Sum of rulership, exaltation, detriment and fall points.
    pub score_basic: i32,
    /// First matching classification.
    pub status_basic: DignityStatus,
}

fn rulerships(body: Body) -> &'static [ZodiacSign] {
    use ZodiacSign::*;
    match body {
        Body::Sun => &[Leo],
        Body::Moon => &[Cancer],
        Body::Mercury => &[Gemini, Virgo],
        Body::Venus => &[Taurus, Libra],
        Body::Mars => &[Aries, Scorpio],
        Body::Jupiter => &[Sagittarius, Pisces],
        Body::Saturn => &[Capricorn, Aquarius],
        _ => &[],
    }
}

fn exaltation(body: Body) -> Option<ZodiacSign> {
    use ZodiacSign::*;
    Some(match body {
        Body::Sun => Aries,
        Body::Moon => Taurus,
        Body::Mercury => Aquarius,
        Body::Venus => Pisces,
        Body::Mars => Capricorn,
        Body::Jupiter => Cancer,
        Body::Saturn => Libra,
        _ => return None,
    })
}

/// Scores `body` in `sign`.
#[must_use]
pub fn score(body: Body, sign: ZodiacSign) -> (i32, DignityStatus) {
    let ruler = rulerships(body).contains(&sign);
    let exalted = exaltation(body) == Some(sign);
    let detriment = rulerships(body).iter().any(|s| s.opposite() == sign);
    let fall = exaltation(body).is_some_and(|s| s.opposite() == sign);

    let total = [(ruler, 5), (exalted, 4), (detriment, -5), (fall, -4)]
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, points)| points)
        .sum();
    let status = if ruler {
        DignityStatus::Ruler
    } else if exalted {
        DignityStatus::Exalted
    } else if detriment {
        DignityStatus::Detriment
    } else if fall {
        DignityStatus::Fall
    } else {
        DignityStatus::Peregrine
    };
    (total, status)
}

/// Dignity of each classical planet present in `positions`.
#[must_use]
pub fn dignity_scores(positions: &PositionSet) -> BTreeMap<Body, DignityScore> {
    Body::CLASSICAL
        .iter()
        .filter_map(|body| positions.get(body).filter(|p| p.is_valid()))
        .map(|p| {
            let (score_basic, status_basic) = score(p.body, p.sign);
            (
                p.body,
                DignityScore {
                    degree: round_to(p.degree, 2),
                    sign: p.sign,
                    score_basic,
                    status_basic,
                },
            )
        })
        .collect()
}
