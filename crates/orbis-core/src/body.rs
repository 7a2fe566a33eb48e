//! Catalog of bodies and sensitive points.
//!
//! - [`Body`] - Closed set of bodies, each carrying its ephemeris provider code
//! - [`Angle`] - Chart angles that take part in aspects alongside bodies
//! - [`ChartPoint`] - Either of the above, used as an aspect endpoint

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChartError;

/// A body or calculated point the ephemeris provider can be asked about.
///
/// Variants are ordered the way they appear in output documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Body {
    /// The Sun.
    Sun,
    /// The Moon.
    Moon,
    /// Mercury.
    Mercury,
    /// Venus.
    Venus,
    /// Mars.
    Mars,
    /// Jupiter.
    Jupiter,
    /// Saturn.
    Saturn,
    /// Uranus.
    Uranus,
    /// Neptune.
    Neptune,
    /// Pluto.
    Pluto,
    /// Chiron.
    Chiron,
    /// Ceres.
    Ceres,
    /// Pallas.
    Pallas,
    /// Juno.
    Juno,
    /// Vesta.
    Vesta,
    /// Mean lunar ascending node.
    #[serde(rename = "Mean_Node")]
    MeanNode,
    /// True (osculating) lunar ascending node.
    #[serde(rename = "True_Node")]
    TrueNode,
    /// Mean lunar apogee (Black Moon Lilith).
    #[serde(rename = "Mean_Lilith")]
    MeanLilith,
    /// Osculating lunar apogee.
    #[serde(rename = "True_Lilith")]
    TrueLilith,
    /// Uranian point Cupido.
    Cupido,
    /// Uranian point Hades.
    Hades,
    /// Uranian point Zeus.
    Zeus,
    /// Uranian point Kronos.
    Kronos,
    /// Uranian point Apollon.
    Apollon,
    /// Uranian point Admetos.
    Admetos,
    /// Uranian point Poseidon.
    Poseidon,
}

impl Body {
    /// Every body in the catalog.
    pub const ALL: [Self; 26] = [
        Self::Sun,
        Self::Moon,
        Self::Mercury,
        Self::Venus,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
        Self::Uranus,
        Self::Neptune,
        Self::Pluto,
        Self::Chiron,
        Self::Ceres,
        Self::Pallas,
        Self::Juno,
        Self::Vesta,
        Self::MeanNode,
        Self::TrueNode,
        Self::MeanLilith,
        Self::TrueLilith,
        Self::Cupido,
        Self::Hades,
        Self::Zeus,
        Self::Kronos,
        Self::Apollon,
        Self::Admetos,
        Self::Poseidon,
    ];

    /// Sun through Pluto.
    pub const PLANETS: [Self; 10] = [
        Self::Sun,
        Self::Moon,
        Self::Mercury,
        Self::Venus,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
        Self::Uranus,
        Self::Neptune,
        Self::Pluto,
    ];

    /// Asteroids, centaur, lunar nodes and apogees.
    pub const ADDITIONAL_POINTS: [Self; 9] = [
        Self::Chiron,
        Self::Ceres,
        Self::Pallas,
        Self::Juno,
        Self::Vesta,
        Self::MeanNode,
        Self::TrueNode,
        Self::MeanLilith,
        Self::TrueLilith,
    ];

    /// Hypothetical Uranian points.
    pub const URANIANS: [Self; 7] = [
        Self::Cupido,
        Self::Hades,
        Self::Zeus,
        Self::Kronos,
        Self::Apollon,
        Self::Admetos,
        Self::Poseidon,
    ];

    /// Bodies tracked for transits and secondary progressions.
    pub const TRANSIT_SET: [Self; 11] = [
        Self::Sun,
        Self::Moon,
        Self::Mercury,
        Self::Venus,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
        Self::Uranus,
        Self::Neptune,
        Self::Pluto,
        Self::TrueNode,
    ];

    /// The seven visible bodies of traditional astrology.
    pub const CLASSICAL: [Self; 7] = [
        Self::Sun,
        Self::Moon,
        Self::Mercury,
        Self::Venus,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
    ];

    /// Numeric body code used by the ephemeris provider.
    #[must_use]
    pub const fn provider_code(self) -> i32 {
        match self {
            Self::Sun => 0,
            Self::Moon => 1,
            Self::Mercury => 2,
            Self::Venus => 3,
            Self::Mars => 4,
            Self::Jupiter => 5,
            Self::Saturn => 6,
            Self::Uranus => 7,
            Self::Neptune => 8,
            Self::Pluto => 9,
            Self::MeanNode => 10,
            Self::TrueNode => 11,
            Self::MeanLilith => 12,
            Self::TrueLilith => 13,
            Self::Chiron => 15,
            Self::Ceres => 17,
            Self::Pallas => 18,
            Self::Juno => 19,
            Self::Vesta => 20,
            Self::Cupido => 40,
            Self::Hades => 41,
            Self::Zeus => 42,
            Self::Kronos => 43,
            Self::Apollon => 44,
            Self::Admetos => 45,
            Self::Poseidon => 47,
        }
    }

    /// Looks a body up by its provider code.
    #[must_use]
    pub fn from_provider_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.provider_code() == code)
    }

    /// Name used in output documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Moon => "Moon",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Uranus => "Uranus",
            Self::Neptune => "Neptune",
            Self::Pluto => "Pluto",
            Self::Chiron => "Chiron",
            Self::Ceres => "Ceres",
            Self::Pallas => "Pallas",
            Self::Juno => "Juno",
            Self::Vesta => "Vesta",
            Self::MeanNode => "Mean_Node",
            Self::TrueNode => "True_Node",
            Self::MeanLilith => "Mean_Lilith",
            Self::TrueLilith => "True_Lilith",
            Self::Cupido => "Cupido",
            Self::Hades => "Hades",
            Self::Zeus => "Zeus",
            Self::Kronos => "Kronos",
            Self::Apollon => "Apollon",
            Self::Admetos => "Admetos",
            Self::Poseidon => "Poseidon",
        }
    }

    /// Returns `true` for calculated lunar points (nodes and apogees).
    #[must_use]
    pub const fn is_lunar_point(self) -> bool {
        matches!(
            self,
            Self::MeanNode | Self::TrueNode | Self::MeanLilith | Self::TrueLilith
        )
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ChartError::InvalidInput(format!("Unknown body: {s}")))
    }
}

/// Chart angles derived from the house computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Angle {
    /// Rising point on the eastern horizon.
    Ascendant,
    /// Midheaven, the upper meridian crossing.
    #[serde(rename = "MC")]
    Midheaven,
    /// Western intersection of the prime vertical and the ecliptic.
    Vertex,
}

impl Angle {
    /// Angles that take part in natal aspects.
    pub const ALL: [Self; 3] = [Self::Ascendant, Self::Midheaven, Self::Vertex];

    /// Name used in output documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascendant => "Ascendant",
            Self::Midheaven => "MC",
            Self::Vertex => "Vertex",
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An aspect endpoint: a body or a chart angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartPoint {
    /// A body from the catalog.
    Body(Body),
    /// A chart angle.
    Angle(Angle),
}

impl ChartPoint {
    /// Returns `true` when this point is a chart angle.
    #[must_use]
    pub const fn is_angle(self) -> bool {
        matches!(self, Self::Angle(_))
    }
}

impl From<Body> for ChartPoint {
    fn from(body: Body) -> Self {
        Self::Body(body)
    }
}

impl From<Angle> for ChartPoint {
    fn from(angle: Angle) -> Self {
        Self::Angle(angle)
    }
}

impl fmt::Display for ChartPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(b) => b.fmt(f),
            Self::Angle(a) => a.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_are_unique() {
        for (i, a) in Body::ALL.iter().enumerate() {
            for b in &Body::ALL[i + 1..] {
                assert_ne!(a.provider_code(), b.provider_code(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_provider_code_lookup() {
        assert_eq!(Body::from_provider_code(11), Some(Body::TrueNode));
        assert_eq!(Body::from_provider_code(46), None);
    }

    #[test]
    fn test_body_from_str() {
        assert_eq!("mean_node".parse::<Body>().unwrap(), Body::MeanNode);
        assert_eq!("Sun".parse::<Body>().unwrap(), Body::Sun);
        assert!("Vulkanus".parse::<Body>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for body in Body::ALL {
            let json = serde_json::to_string(&body).unwrap();
            assert_eq!(json, format!("\"{body}\""));
        }
    }

    #[test]
    fn test_chart_point_serializes_flat() {
        let p = ChartPoint::from(Angle::Midheaven);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"MC\"");
        let back: ChartPoint = serde_json::from_str("\"True_Node\"").unwrap();
        assert_eq!(back, ChartPoint::Body(Body::TrueNode));
        assert!(!back.is_angle());
    }
}
