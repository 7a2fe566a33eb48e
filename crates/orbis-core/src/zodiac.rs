//! Zodiac normalization and angle helpers.
//!
//! [`ZodiacPlacement::from_longitude`] is the position normalizer: it turns an
//! ecliptic longitude into sign, degree-in-sign, decan and the sign's
//! element, modality and polarity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalizes an angle to `[0, 360)`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Shortest signed difference `to - from`, normalized to `(-180, 180]`.
#[must_use]
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Unsigned angular separation on the circle, in `[0, 180]`.
#[must_use]
pub fn separation(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Rounds `value` to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The twelve tropical signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    /// 0° to 30°.
    Aries,
    /// 30° to 60°.
    Taurus,
    /// 60° to 90°.
    Gemini,
    /// 90° to 120°.
    Cancer,
    /// 120° to 150°.
    Leo,
    /// 150° to 180°.
    Virgo,
    /// 180° to 210°.
    Libra,
    /// 210° to 240°.
    Scorpio,
    /// 240° to 270°.
    Sagittarius,
    /// 270° to 300°.
    Capricorn,
    /// 300° to 330°.
    Aquarius,
    /// 330° to 360°.
    Pisces,
}

impl ZodiacSign {
    /// Signs in zodiacal order.
    pub const ALL: [Self; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    /// Sign containing the given ecliptic longitude.
    #[must_use]
    pub fn from_longitude(longitude: f64) -> Self {
        let idx = (normalize_degrees(longitude) / 30.0).floor() as usize;
        Self::ALL[idx.min(11)]
    }

    /// Zero-based position in the zodiac.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Longitude at which this sign begins.
    #[must_use]
    pub fn start_longitude(self) -> f64 {
        self.index() as f64 * 30.0
    }

    /// The sign 180° away.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 6) % 12]
    }

    /// Triplicity element.
    #[must_use]
    pub const fn element(self) -> Element {
        match self as usize % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    /// Quadruplicity.
    #[must_use]
    pub const fn modality(self) -> Modality {
        match self as usize % 3 {
            0 => Modality::Cardinal,
            1 => Modality::Fixed,
            _ => Modality::Mutable,
        }
    }

    /// Masculine/feminine polarity.
    #[must_use]
    pub const fn polarity(self) -> Polarity {
        if self as usize % 2 == 0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Classical element of a sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Aries, Leo, Sagittarius.
    Fire,
    /// Taurus, Virgo, Capricorn.
    Earth,
    /// Gemini, Libra, Aquarius.
    Air,
    /// Cancer, Scorpio, Pisces.
    Water,
}

/// Modality of a sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// Aries, Cancer, Libra, Capricorn.
    Cardinal,
    /// Taurus, Leo, Scorpio, Aquarius.
    Fixed,
    /// Gemini, Virgo, Sagittarius, Pisces.
    Mutable,
}

/// Polarity of a sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Fire and air signs.
    Positive,
    /// Earth and water signs.
    Negative,
}

/// A longitude decomposed into its zodiac coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZodiacPlacement {
    /// Sign containing the longitude.
    pub sign: ZodiacSign,
    /// Offset within the sign, `[0, 30)`.
    pub degree_in_sign: f64,
    /// Ten-degree third of the sign, 1 to 3.
    pub decan: u8,
}

impl ZodiacPlacement {
    /// Normalizes `longitude` and decomposes it.
    #[must_use]
    pub fn from_longitude(longitude: f64) -> Self {
        let lon = normalize_degrees(longitude);
        let sign = ZodiacSign::from_longitude(lon);
        let degree_in_sign = (lon - sign.start_longitude()).clamp(0.0, 30.0 - f64::EPSILON);
        let decan = ((degree_in_sign / 10.0).floor() as u8 + 1).min(3);
        Self {
            sign,
            degree_in_sign,
            decan,
        }
    }

    /// Element of the placement's sign.
    #[must_use]
    pub const fn element(&self) -> Element {
        self.sign.element()
    }

    /// Modality of the placement's sign.
    #[must_use]
    pub const fn modality(&self) -> Modality {
        self.sign.modality()
    }

    /// Polarity of the placement's sign.
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.sign.polarity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);
    }

    #[test]
    fn test_signed_delta_range() {
        assert!((signed_delta(350.0, 10.0) - 20.0).abs() < 1e-12);
        assert!((signed_delta(10.0, 350.0) + 20.0).abs() < 1e-12);
        assert_eq!(signed_delta(0.0, 180.0), 180.0);
        assert_eq!(signed_delta(180.0, 0.0), 180.0);
    }

    #[test]
    fn test_separation_wraps() {
        assert!((separation(359.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((separation(0.0, 180.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_placement_capricorn() {
        let p = ZodiacPlacement::from_longitude(280.4);
        assert_eq!(p.sign, ZodiacSign::Capricorn);
        assert!((p.degree_in_sign - 10.4).abs() < 1e-9);
        assert_eq!(p.decan, 2);
        assert_eq!(p.element(), Element::Earth);
        assert_eq!(p.modality(), Modality::Cardinal);
        assert_eq!(p.polarity(), Polarity::Negative);
    }

    #[test]
    fn test_placement_boundaries() {
        let p = ZodiacPlacement::from_longitude(360.0);
        assert_eq!(p.sign, ZodiacSign::Aries);
        assert_eq!(p.decan, 1);
        let p = ZodiacPlacement::from_longitude(29.999_999);
        assert_eq!(p.sign, ZodiacSign::Aries);
        assert_eq!(p.decan, 3);
    }

    #[test]
    fn test_sign_qualities_cycle() {
        assert_eq!(ZodiacSign::Leo.element(), Element::Fire);
        assert_eq!(ZodiacSign::Scorpio.modality(), Modality::Fixed);
        assert_eq!(ZodiacSign::Pisces.modality(), Modality::Mutable);
        assert_eq!(ZodiacSign::Aquarius.polarity(), Polarity::Positive);
        assert_eq!(ZodiacSign::Aries.opposite(), ZodiacSign::Libra);
    }
}
