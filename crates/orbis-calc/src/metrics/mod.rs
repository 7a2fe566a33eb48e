//! Derived metrics over a position set.
//!
//! Every function here is pure apart from [`stars::fixed_stars`], which queries
//! the provider's catalog.

pub mod antiscia;
pub mod declination;
pub mod dignity;
pub mod horizon;
pub mod lunation;
pub mod midpoints;
pub mod parts;
pub mod stars;

pub use antiscia::{AntisciaEntry, MirrorConnection, MirrorPoint, calculate_antiscia};
pub use declination::{Declination, declinations};
pub use dignity::{DignityScore, DignityStatus, dignity_scores};
pub use horizon::{HorizonPosition, horizon_positions};
pub use lunation::{LunationPhase, MoonPhase, ProgressedMoonPhase, lunation_cycle, progressed_moon_phase};
pub use midpoints::{Midpoint, MidpointAspect, MidpointHit, midpoint_analysis};
pub use parts::{ArabicPart, arabic_parts, part_of_fortune};
pub use stars::{StarPosition, fixed_stars};

#[cfg(test)]
pub(crate) fn test_positions(longitudes: &[(orbis_core::Body, f64)]) -> crate::positions::PositionSet {
    use orbis_core::{CelestialPosition, RawPosition};

    longitudes
        .iter()
        .map(|&(body, longitude)| {
            let raw = RawPosition {
                longitude,
                latitude: 0.0,
                distance: 1.0,
                speed: 1.0,
            };
            (body, CelestialPosition::from_raw(body, raw, 1))
        })
        .collect()
}
