//! Core data types for chart computation.
//!
//! - [`GeoLocation`] - Observer latitude and longitude
//! - [`RawPosition`] - What the ephemeris provider returns for one body
//! - [`CelestialPosition`] - A normalized, house-located body position
//! - [`HouseSystem`] / [`HouseCuspSet`] - House division and its result
//! - [`EclipseEvent`] - A located solar or lunar eclipse
//! - [`FixedStarPosition`] - A catalog star precessed to a date
//! - [`Section`] - A sub-result that either computed or carries an error

use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

use crate::body::Body;
use crate::error::{ChartError, Result};
use crate::zodiac::{ZodiacPlacement, ZodiacSign, normalize_degrees, round_to};

/// Observer position on the Earth.
///
/// Deserialization runs the same range checks as [`GeoLocation::new`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoLocation {
    /// Geodetic latitude in degrees, north positive.
    pub latitude: f64,
    /// Geodetic longitude in degrees, east positive.
    pub longitude: f64,
}

impl GeoLocation {
    /// Creates a validated location.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] when a coordinate is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ChartError::InvalidInput(format!(
                "Latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ChartError::InvalidInput(format!(
                "Longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl<'de> Deserialize<'de> for GeoLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.latitude, raw.longitude).map_err(de::Error::custom)
    }
}

/// Raw ecliptic sample returned by an ephemeris provider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Ecliptic longitude of date, degrees.
    pub longitude: f64,
    /// Ecliptic latitude, degrees.
    pub latitude: f64,
    /// Geocentric distance in AU.
    pub distance: f64,
    /// Longitudinal speed, degrees per day.
    pub speed: f64,
}

/// Position of one body, normalized and located in a house.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialPosition {
    /// The body.
    pub body: Body,
    /// Ecliptic longitude in `[0, 360)`.
    pub degree: f64,
    /// Ecliptic latitude.
    pub latitude: f64,
    /// Geocentric distance in AU.
    pub distance: f64,
    /// Longitudinal speed in degrees per day.
    pub speed: f64,
    /// `true` when the speed is negative.
    pub retrograde: bool,
    /// Sign containing the longitude.
    pub sign: ZodiacSign,
    /// Offset within the sign.
    pub degree_in_sign: f64,
    /// Decan within the sign, 1 to 3.
    pub decan: u8,
    /// House 1 to 12, or 0 when undetermined.
    pub house: u8,
    /// Set when the provider lookup failed and the other fields are placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CelestialPosition {
    /// Builds a position from a raw provider sample and an already located house.
    #[must_use]
    pub fn from_raw(body: Body, raw: RawPosition, house: u8) -> Self {
        let degree = normalize_degrees(raw.longitude);
        let placement = ZodiacPlacement::from_longitude(degree);
        Self {
            body,
            degree: round_to(degree, 4),
            latitude: round_to(raw.latitude, 4),
            distance: round_to(raw.distance, 4),
            speed: round_to(raw.speed, 4),
            retrograde: raw.speed < 0.0,
            sign: placement.sign,
            degree_in_sign: round_to(placement.degree_in_sign, 2),
            decan: placement.decan,
            house,
            error: None,
        }
    }

    /// Zeroed entry recording a failed lookup.
    #[must_use]
    pub fn placeholder(body: Body, error: impl Into<String>) -> Self {
        Self {
            body,
            degree: 0.0,
            latitude: 0.0,
            distance: 0.0,
            speed: 0.0,
            retrograde: false,
            sign: ZodiacSign::Aries,
            degree_in_sign: 0.0,
            decan: 1,
            house: 0,
            error: Some(error.into()),
        }
    }

    /// Returns `true` when this entry holds real data.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// House division method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HouseSystem {
    /// Time-based trisection of semi-arcs. Code `P`.
    #[default]
    Placidus,
    /// Space-based trisection of the ecliptic quadrants. Code `O`.
    Porphyry,
    /// 30° houses from the ascendant. Code `E`.
    Equal,
    /// Sign-aligned houses starting at the ascendant's sign. Code `W`.
    WholeSign,
    /// Equal division of the celestial equator. Code `R`.
    Regiomontanus,
    /// Equal division of the prime vertical. Code `C`.
    Campanus,
}

impl HouseSystem {
    /// Single-letter code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Placidus => 'P',
            Self::Porphyry => 'O',
            Self::Equal => 'E',
            Self::WholeSign => 'W',
            Self::Regiomontanus => 'R',
            Self::Campanus => 'C',
        }
    }

    /// Looks a system up by its single-letter code.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'P' => Some(Self::Placidus),
            'O' => Some(Self::Porphyry),
            'E' | 'A' => Some(Self::Equal),
            'W' => Some(Self::WholeSign),
            'R' => Some(Self::Regiomontanus),
            'C' => Some(Self::Campanus),
            _ => None,
        }
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for HouseSystem {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_code(c),
            _ => None,
        }
        .ok_or_else(|| ChartError::InvalidInput(format!("Unknown house system: {s}")))
    }
}

/// The four angles computed alongside house cusps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartAngles {
    /// Ascendant longitude.
    pub ascendant: f64,
    /// Midheaven longitude.
    pub mc: f64,
    /// Right ascension of the midheaven, degrees.
    pub armc: f64,
    /// Vertex longitude.
    pub vertex: f64,
}

/// Twelve house cusps plus angles.
///
/// Cusps need not be monotonic; [`crate::houses::locate_house`] handles wraparound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseCuspSet {
    /// System the cusps were computed with.
    pub house_system: HouseSystem,
    /// Cusp longitudes; index 0 is house 1.
    pub cusps: [f64; 12],
    /// Chart angles.
    pub angles: ChartAngles,
    /// Set when the provider failed and the cusps are zeroed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HouseCuspSet {
    /// Rounds cusps and angles to two decimals for output.
    #[must_use]
    pub fn rounded(mut self) -> Self {
        for c in &mut self.cusps {
            *c = round_to(*c, 2);
        }
        self.angles = ChartAngles {
            ascendant: round_to(self.angles.ascendant, 2),
            mc: round_to(self.angles.mc, 2),
            armc: round_to(self.angles.armc, 2),
            vertex: round_to(self.angles.vertex, 2),
        };
        self
    }

    /// Zeroed cusp set recording a provider failure.
    #[must_use]
    pub fn failed(house_system: HouseSystem, error: impl Into<String>) -> Self {
        Self {
            house_system,
            cusps: [0.0; 12],
            angles: ChartAngles::default(),
            error: Some(error.into()),
        }
    }

    /// Cusp longitude of a 1-based house.
    #[must_use]
    pub fn cusp(&self, house: u8) -> Option<f64> {
        usize::from(house)
            .checked_sub(1)
            .and_then(|i| self.cusps.get(i).copied())
    }

    /// Returns `true` when the cusps hold real data.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Solar or lunar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EclipseKind {
    /// The Moon obscures the Sun.
    Solar,
    /// The Earth's shadow falls on the Moon.
    Lunar,
}

/// Eclipse classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EclipseClass {
    /// Total solar or lunar eclipse.
    Total,
    /// Annular solar eclipse.
    Annular,
    /// Solar eclipse that is annular along part of the track and total elsewhere.
    Hybrid,
    /// Partial solar or lunar eclipse.
    Partial,
    /// Penumbral lunar eclipse.
    Penumbral,
}

/// A located eclipse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EclipseEvent {
    /// Julian day (UT) of greatest eclipse.
    pub jd: f64,
    /// Solar or lunar.
    pub kind: EclipseKind,
    /// Total, partial and so on.
    pub class: EclipseClass,
    /// Obscured fraction of the diameter (umbral magnitude for lunar eclipses).
    pub magnitude: f64,
    /// Lunation number of the syzygy, used as the cycle identifier.
    pub lunation: i64,
}

impl EclipseEvent {
    /// Label such as `Solar Total`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:?} {:?}", self.kind, self.class)
    }
}

/// A fixed star precessed to a date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedStarPosition {
    /// Ecliptic longitude of date.
    pub longitude: f64,
    /// Ecliptic latitude.
    pub latitude: f64,
    /// Visual magnitude.
    pub magnitude: f64,
}

/// A sub-result that either computed or failed in isolation.
///
/// Serializes as the inner value, or as `{"error": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    /// The value computed.
    Ready(T),
    /// The sub-computation failed; siblings are unaffected.
    Failed {
        /// Reason for the failure.
        error: String,
    },
}

impl<T> Section<T> {
    /// Wraps a failure reason.
    #[must_use]
    pub fn failed(error: impl fmt::Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    /// The computed value, if any.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Failed { .. } => None,
        }
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

impl<T, E: fmt::Display> From<std::result::Result<T, E>> for Section<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Ready(v),
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validation() {
        assert!(GeoLocation::new(41.0, 29.0).is_ok());
        assert!(GeoLocation::new(91.0, 0.0).is_err());
        assert!(GeoLocation::new(0.0, -181.0).is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_location_deserialization_is_validated() {
        let ok: GeoLocation = serde_json::from_str(r#"{"latitude":41.0,"longitude":29.0}"#).unwrap();
        assert_eq!(ok, GeoLocation::new(41.0, 29.0).unwrap());
        assert_eq!(
            serde_json::to_value(ok).unwrap(),
            serde_json::json!({ "latitude": 41.0, "longitude": 29.0 })
        );

        for json in [
            r#"{"latitude":95.0,"longitude":29.0}"#,
            r#"{"latitude":41.0,"longitude":500.0}"#,
            r#"{"latitude":41.0}"#,
        ] {
            let err = serde_json::from_str::<GeoLocation>(json).unwrap_err();
            assert!(err.is_data(), "{json}: {err}");
        }
    }

    #[test]
    fn test_retrograde_follows_speed_sign() {
        let raw = RawPosition {
            longitude: 15.0,
            latitude: 1.0,
            distance: 0.8,
            speed: -0.35,
        };
        let pos = CelestialPosition::from_raw(Body::Mercury, raw, 3);
        assert!(pos.retrograde);

        let raw = RawPosition { speed: 1.2, ..raw };
        let pos = CelestialPosition::from_raw(Body::Mercury, raw, 3);
        assert!(!pos.retrograde);
        assert_eq!(pos.sign, ZodiacSign::Aries);
    }

    #[test]
    fn test_placeholder_is_zeroed() {
        let pos = CelestialPosition::placeholder(Body::Ceres, "no orbit");
        assert_eq!(pos.house, 0);
        assert_eq!(pos.decan, 1);
        assert_eq!(pos.degree, 0.0);
        assert!(!pos.is_valid());
        let json = serde_json::to_value(&pos).unwrap();
        assert_eq!(json["error"], "no orbit");
    }

    #[test]
    fn test_house_system_codes() {
        assert_eq!("P".parse::<HouseSystem>().unwrap(), HouseSystem::Placidus);
        assert_eq!("w".parse::<HouseSystem>().unwrap(), HouseSystem::WholeSign);
        assert!("PX".parse::<HouseSystem>().is_err());
        assert_eq!(HouseSystem::default().code(), 'P');
    }

    #[test]
    fn test_section_serialization() {
        let ok: Section<Vec<u8>> = Section::Ready(vec![1, 2]);
        assert_eq!(serde_json::to_string(&ok).unwrap(), "[1,2]");

        let failed: Section<Vec<u8>> = Section::failed("boom");
        assert_eq!(serde_json::to_string(&failed).unwrap(), r#"{"error":"boom"}"#);

        let back: Section<Vec<u8>> = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(back.error(), Some("boom"));
    }

    #[test]
    fn test_failed_cusp_set() {
        let set = HouseCuspSet::failed(HouseSystem::Placidus, "polar");
        assert!(!set.is_valid());
        assert_eq!(set.cusp(1), Some(0.0));
        assert_eq!(set.cusp(13), None);
        assert_eq!(set.cusp(0), None);
    }
}
