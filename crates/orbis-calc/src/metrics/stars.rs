//! Fixed stars.

use std::collections::BTreeMap;

use orbis_core::{EphemerisProvider, ZodiacPlacement, ZodiacSign, round_to};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A fixed star at a date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarPosition {
    /// Ecliptic longitude of date, two decimals.
    pub degree: f64,
    /// Sign.
    pub sign: ZodiacSign,
    /// Offset within the sign.
    pub degree_in_sign: f64,
    /// Ecliptic latitude, four decimals.
    pub latitude: f64,
    /// Visual magnitude.
    pub magnitude: f64,
}

/// Positions of the named stars; an empty list means the provider's catalog.
/// Stars the provider does not know are skipped.
pub fn fixed_stars(provider: &dyn EphemerisProvider, jd: f64, names: &[String]) -> BTreeMap<String, StarPosition> {
    let catalog;
    let names = if names.is_empty() {
        catalog = provider.fixed_star_names();
        &catalog
    } else {
        names
    };

    names
        .iter()
        .filter_map(|name| match provider.fixed_star(jd, name) {
            Ok(star) => {
                let placement = ZodiacPlacement::from_longitude(star.longitude);
                Some((
                    name.clone(),
                    StarPosition {
                        degree: round_to(star.longitude, 2),
                        sign: placement.sign,
                        degree_in_sign: round_to(placement.degree_in_sign, 2),
                        latitude: round_to(star.latitude, 4),
                        magnitude: round_to(star.magnitude, 2),
                    },
                ))
            }
            Err(e) => {
                debug!(star = %name, error = %e, "Skipping fixed star");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_ephemeris::AnalyticEphemeris;

    #[test]
    fn test_unknown_stars_skipped() {
        let provider = AnalyticEphemeris::new();
        let names = vec!["Regulus".to_string(), "Vulcan Prime".to_string()];
        let stars = fixed_stars(&provider, 2_451_545.0, &names);
        assert_eq!(stars.len(), 1);
        assert_eq!(stars["Regulus"].sign, ZodiacSign::Leo);
    }

    #[test]
    fn test_empty_list_uses_catalog() {
        let provider = AnalyticEphemeris::new();
        let stars = fixed_stars(&provider, 2_451_545.0, &[]);
        assert_eq!(stars.len(), provider.fixed_star_names().len());
    }
}
