//! Bright fixed stars, J2000 ecliptic coordinates.

use orbis_core::{ChartError, FixedStarPosition, Result, normalize_degrees};
use orbis_core::time::J2000_JD;

/// Annual general precession in longitude, degrees.
const PRECESSION_PER_YEAR: f64 = 50.29 / 3600.0;

/// Name, J2000 ecliptic longitude, latitude and visual magnitude.
const CATALOG: [(&str, f64, f64, f64); 24] = [
    ("Algol", 56.17, 22.43, 2.12),
    ("Alcyone", 60.00, 4.05, 2.87),
    ("Aldebaran", 69.79, -5.47, 0.85),
    ("Rigel", 76.83, -31.12, 0.13),
    ("Capella", 81.86, 22.87, 0.08),
    ("Polaris", 88.58, 66.10, 1.98),
    ("Betelgeuse", 88.79, -16.03, 0.50),
    ("Sirius", 104.08, -39.61, -1.46),
    ("Canopus", 105.00, -75.82, -0.74),
    ("Castor", 110.23, 10.09, 1.58),
    ("Pollux", 113.22, 6.68, 1.14),
    ("Procyon", 115.79, -16.02, 0.34),
    ("Regulus", 149.83, 0.46, 1.35),
    ("Denebola", 171.62, 12.27, 2.13),
    ("Vindemiatrix", 189.94, 16.21, 2.83),
    ("Spica", 203.84, -2.05, 0.98),
    ("Arcturus", 204.23, 30.73, -0.05),
    ("Zuben Elgenubi", 225.08, 0.33, 2.75),
    ("Antares", 249.76, -4.57, 1.06),
    ("Vega", 285.32, 61.73, 0.03),
    ("Altair", 301.79, 29.30, 0.77),
    ("Fomalhaut", 333.87, -21.13, 1.16),
    ("Deneb", 335.33, 59.91, 1.25),
    ("Achernar", 345.30, -59.37, 0.46),
];

/// Catalog names in longitude order.
pub(crate) fn names() -> Vec<String> {
    CATALOG.iter().map(|(name, ..)| (*name).to_string()).collect()
}

/// Looks a star up by name, case-insensitively, and precesses it to `jd`.
pub(crate) fn position(jd: f64, name: &str) -> Result<FixedStarPosition> {
    let (_, lon, lat, mag) = CATALOG
        .iter()
        .find(|(n, ..)| n.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| ChartError::NotSupported(format!("Unknown fixed star: {name}")))?;
    let years = (jd - J2000_JD) / 365.25;
    Ok(FixedStarPosition {
        longitude: normalize_degrees(lon + PRECESSION_PER_YEAR * years),
        latitude: *lat,
        magnitude: *mag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precession_over_a_century() {
        let now = position(J2000_JD, "Regulus").unwrap();
        let later = position(J2000_JD + 36_525.0, "regulus").unwrap();
        assert!(((later.longitude - now.longitude) - 1.397).abs() < 0.01);
        assert_eq!(now.magnitude, 1.35);
    }

    #[test]
    fn test_unknown_star_is_not_supported() {
        assert!(matches!(
            position(J2000_JD, "Nibiru"),
            Err(ChartError::NotSupported(_))
        ));
        assert_eq!(names().len(), 24);
    }
}
