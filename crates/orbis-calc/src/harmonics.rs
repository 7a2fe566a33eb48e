//! Harmonic (divisional) charts.

use std::collections::BTreeMap;

use orbis_core::{Body, ChartError, Result, ZodiacPlacement, ZodiacSign, normalize_degrees, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::{PositionSet, valid_points};

/// Harmonics computed by the deep harmonic analysis by default.
pub const DEFAULT_HARMONICS: [u32; 20] = [
    1, 2, 3, 4, 7, 9, 10, 12, 13, 16, 17, 19, 20, 23, 24, 27, 30, 40, 45, 60,
];

/// A body's position in a harmonic chart.
///
/// Speed, retrograde and house are dropped: they carry no meaning after the transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicPosition {
    /// Transformed longitude, two decimals.
    pub degree: f64,
    /// Sign of the transformed longitude.
    pub sign: ZodiacSign,
    /// Offset within the sign, two decimals.
    pub degree_in_sign: f64,
}

/// One harmonic chart with its divisional name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicChart {
    /// Divisional chart name, such as `Navamsa (D9)`.
    pub name: String,
    /// What the chart is read for.
    pub details: String,
    /// Transformed positions.
    pub planet_positions: BTreeMap<Body, HarmonicPosition>,
}

/// Multiplies every valid longitude by `n`, modulo 360.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] when `n` is zero.
pub fn harmonic(positions: &PositionSet, n: u32) -> Result<BTreeMap<Body, HarmonicPosition>> {
    if n == 0 {
        return Err(ChartError::InvalidInput(
            "Harmonic number must be positive".to_string(),
        ));
    }
    Ok(valid_points(positions)
        .map(|(body, lon)| {
            let degree = normalize_degrees(lon * f64::from(n));
            let placement = ZodiacPlacement::from_longitude(degree);
            (
                body,
                HarmonicPosition {
                    degree: round_to(degree, 2),
                    sign: placement.sign,
                    degree_in_sign: round_to(placement.degree_in_sign, 2),
                },
            )
        })
        .collect())
}

/// Divisional name and reading of a harmonic.
#[must_use]
pub fn describe(n: u32) -> (String, &'static str) {
    let (name, details) = match n {
        1 => ("Rasi", "The birth chart as a whole"),
        2 => ("Hora", "Wealth and the flow of finances"),
        3 => ("Drekkana", "Courage, siblings and drive"),
        4 => ("Chaturthamsa", "Property, home and relocation"),
        7 => ("Saptamsa", "Children and creativity"),
        9 => ("Navamsa", "Marriage, partnership and dharma"),
        10 => ("Dasamsa", "Career and public standing"),
        12 => ("Dvadasamsa", "Parents and ancestry"),
        13 => ("Trayodashamsa", "Desire, passion and willpower"),
        16 => ("Shodasamsa", "Vehicles, comfort and happiness"),
        17 => ("Saptadashamsa", "Status, honour and recognition"),
        19 => ("Navatara", "Spiritual awareness"),
        20 => ("Vimsamsa", "Devotion and spiritual progress"),
        23 => ("Trimsamsa-23", "Learning and communication"),
        24 => ("Chaturvimsamsa", "Education and knowledge"),
        27 => ("Nakshatramsa", "Strength and stamina"),
        30 => ("Trimsamsa", "Hardship and illness"),
        40 => ("Khavedamsa", "Maternal lineage"),
        45 => ("Akshavedamsa", "Paternal lineage"),
        60 => ("Shashtiamsa", "Past karma"),
        _ => ("Harmonic", "Custom harmonic"),
    };
    (format!("{name} (D{n})"), details)
}

/// Computes every harmonic in `numbers`, keyed `H<n>`.
#[must_use]
pub fn deep_harmonic_analysis(positions: &PositionSet, numbers: &[u32]) -> BTreeMap<String, HarmonicChart> {
    numbers
        .iter()
        .filter_map(|&n| {
            let planet_positions = harmonic(positions, n).ok()?;
            let (name, details) = describe(n);
            Some((
                format!("H{n}"),
                HarmonicChart {
                    name,
                    details: details.to_string(),
                    planet_positions,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_positions as set;
    use orbis_core::CelestialPosition;

    #[test]
    fn test_first_harmonic_is_identity() {
        let positions = set(&[(Body::Sun, 280.37), (Body::Moon, 12.5), (Body::Mars, 359.99)]);
        let h1 = harmonic(&positions, 1).unwrap();
        for (body, p) in &positions {
            assert!((h1[body].degree - p.degree).abs() < 0.01);
            assert_eq!(h1[body].sign, p.sign);
        }
    }

    #[test]
    fn test_ninth_harmonic() {
        let positions = set(&[(Body::Venus, 45.0)]);
        let h9 = harmonic(&positions, 9).unwrap();
        assert_eq!(h9[&Body::Venus].degree, 45.0);
        assert_eq!(h9[&Body::Venus].sign, ZodiacSign::Taurus);
    }

    #[test]
    fn test_zero_is_rejected_and_placeholders_skipped() {
        let mut positions = set(&[(Body::Sun, 10.0)]);
        positions.insert(
            Body::Chiron,
            CelestialPosition::placeholder(Body::Chiron, "unsupported"),
        );
        assert!(harmonic(&positions, 0).is_err());
        assert_eq!(harmonic(&positions, 2).unwrap().len(), 1);
    }

    #[test]
    fn test_analysis_keys() {
        let positions = set(&[(Body::Sun, 10.0)]);
        let analysis = deep_harmonic_analysis(&positions, &DEFAULT_HARMONICS);
        assert_eq!(analysis.len(), 20);
        assert_eq!(analysis["H9"].name, "Navamsa (D9)");
        assert!(analysis.contains_key("H60"));
    }
}
