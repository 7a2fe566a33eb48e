//! Antiscia and contra-antiscia.

use std::collections::BTreeMap;

use orbis_core::{Body, ZodiacSign, normalize_degrees, round_to, separation};
use serde::{Deserialize, Serialize};

use crate::positions::{PositionSet, valid_points};

/// Another body sitting on a mirror point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MirrorConnection {
    /// The body on the mirror point.
    pub planet: Body,
    /// Its longitude.
    pub degree: f64,
    /// Its sign.
    pub sign: ZodiacSign,
    /// Distance from the mirror point.
    pub orb: f64,
}

/// A mirror point and the bodies within orb of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MirrorPoint {
    /// Longitude of the mirror point.
    pub degree: f64,
    /// Sign of the mirror point.
    pub sign: ZodiacSign,
    /// Connections sorted by orb.
    pub connections: Vec<MirrorConnection>,
}

/// Both reflections of one body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntisciaEntry {
    /// The body's own longitude.
    pub original_degree: f64,
    /// The body's own sign.
    pub original_sign: ZodiacSign,
    /// Reflection across the solstice axis.
    pub antiscia: MirrorPoint,
    /// Reflection across the equinox axis.
    pub contra_antiscia: MirrorPoint,
}

/// Reflection across the 0° Cancer / 0° Capricorn axis.
#[must_use]
pub fn antiscion(longitude: f64) -> f64 {
    normalize_degrees(180.0 - longitude)
}

/// Reflection across the 0° Aries / 0° Libra axis.
#[must_use]
pub fn contra_antiscion(longitude: f64) -> f64 {
    normalize_degrees(360.0 - longitude)
}

fn mirror(point: f64, own: Body, others: &[(Body, f64)], orb: f64) -> MirrorPoint {
    let mut connections: Vec<MirrorConnection> = others
        .iter()
        .filter(|(body, _)| *body != own)
        .filter_map(|&(body, lon)| {
            let distance = separation(point, lon);
            (distance <= orb).then(|| MirrorConnection {
                planet: body,
                degree: round_to(lon, 2),
                sign: ZodiacSign::from_longitude(lon),
                orb: round_to(distance, 2),
            })
        })
        .collect();
    connections.sort_by(|a, b| a.orb.total_cmp(&b.orb));
    MirrorPoint {
        degree: round_to(point, 2),
        sign: ZodiacSign::from_longitude(point),
        connections,
    }
}

/// Antiscia of every valid body, with connections within `orb`.
#[must_use]
pub fn calculate_antiscia(positions: &PositionSet, orb: f64) -> BTreeMap<Body, AntisciaEntry> {
    let points: Vec<(Body, f64)> = valid_points(positions).collect();
    points
        .iter()
        .map(|&(body, lon)| {
            (
                body,
                AntisciaEntry {
                    original_degree: round_to(lon, 2),
                    original_sign: ZodiacSign::from_longitude(lon),
                    antiscia: mirror(antiscion(lon), body, &points, orb),
                    contra_antiscia: mirror(contra_antiscion(lon), body, &points, orb),
                },
            )
        })
        .collect()
}
