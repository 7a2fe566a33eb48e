//! Calculation settings.

use chrono::FixedOffset;
use orbis_core::time::{offset_from_longitude, offset_from_minutes};
use orbis_core::{HouseSystem, Result};

use crate::aspects::OrbTable;
use crate::forecast::solver::RootSolver;
use crate::harmonics::DEFAULT_HARMONICS;

/// How a UTC offset is chosen when the request carries none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OffsetPolicy {
    /// Nautical zone of the location, `round(longitude / 15)` hours.
    #[default]
    FromLongitude,
    /// A fixed offset in minutes east of UTC.
    Fixed(i32),
}

impl OffsetPolicy {
    /// Resolves the offset for a longitude.
    ///
    /// # Errors
    /// Returns [`orbis_core::ChartError::InvalidInput`] for an out-of-range fixed offset.
    pub fn resolve(self, longitude: f64) -> Result<FixedOffset> {
        match self {
            Self::FromLongitude => Ok(offset_from_longitude(longitude)),
            Self::Fixed(minutes) => offset_from_minutes(minutes),
        }
    }
}

/// Settings shared by every calculation of a [`ChartAssembler`](crate::ChartAssembler).
#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    /// House system used when the request names none.
    pub house_system: HouseSystem,
    /// Maximum orb per aspect type.
    pub orbs: OrbTable,
    /// Harmonic numbers of the deep harmonic analysis.
    pub harmonics: Vec<u32>,
    /// Half-width of the eclipse window around birth, in days.
    pub natal_eclipse_window_days: f64,
    /// Half-width of the eclipse window around the reference instant, in days.
    pub current_eclipse_window_days: f64,
    /// Upper bound on eclipses collected per window.
    pub eclipse_scan_cap: usize,
    /// Solar return search parameters.
    pub solar_return: RootSolver,
    /// Lunar return search parameters.
    pub lunar_return: RootSolver,
    /// Fixed stars to report; empty means the provider's whole catalog.
    pub fixed_stars: Vec<String>,
    /// Orb for antiscia connections.
    pub antiscia_orb: f64,
    /// Orb for midpoint hits.
    pub midpoint_orb: f64,
    /// UTC offset used when the request carries none.
    pub offset_policy: OffsetPolicy,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            house_system: HouseSystem::Placidus,
            orbs: OrbTable::default(),
            harmonics: DEFAULT_HARMONICS.to_vec(),
            natal_eclipse_window_days: 365.0,
            current_eclipse_window_days: 180.0,
            eclipse_scan_cap: 64,
            solar_return: RootSolver::SOLAR,
            lunar_return: RootSolver::LUNAR,
            fixed_stars: Vec::new(),
            antiscia_orb: 1.0,
            midpoint_orb: 2.0,
            offset_policy: OffsetPolicy::FromLongitude,
        }
    }
}

impl ChartConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default house system.
    #[must_use]
    pub const fn with_house_system(mut self, system: HouseSystem) -> Self {
        self.house_system = system;
        self
    }

    /// Sets the orb table.
    #[must_use]
    pub fn with_orbs(mut self, orbs: OrbTable) -> Self {
        self.orbs = orbs;
        self
    }

    /// Sets the harmonic list. Zero entries are dropped.
    #[must_use]
    pub fn with_harmonics(mut self, harmonics: impl IntoIterator<Item = u32>) -> Self {
        self.harmonics = harmonics.into_iter().filter(|n| *n > 0).collect();
        self
    }

    /// Sets both eclipse window half-widths, in days.
    #[must_use]
    pub const fn with_eclipse_windows(mut self, natal_days: f64, current_days: f64) -> Self {
        self.natal_eclipse_window_days = natal_days;
        self.current_eclipse_window_days = current_days;
        self
    }

    /// Sets the per-window eclipse cap.
    #[must_use]
    pub const fn with_eclipse_scan_cap(mut self, cap: usize) -> Self {
        self.eclipse_scan_cap = cap;
        self
    }

    /// Sets the return solvers.
    #[must_use]
    pub const fn with_return_solvers(mut self, solar: RootSolver, lunar: RootSolver) -> Self {
        self.solar_return = solar;
        self.lunar_return = lunar;
        self
    }

    /// Sets the fixed stars to report.
    #[must_use]
    pub fn with_fixed_stars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_stars = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fallback UTC offset policy.
    #[must_use]
    pub const fn with_offset_policy(mut self, policy: OffsetPolicy) -> Self {
        self.offset_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChartConfig::new();
        assert_eq!(config.house_system, HouseSystem::Placidus);
        assert_eq!(config.harmonics.len(), 20);
        assert_eq!(config.natal_eclipse_window_days, 365.0);
        assert_eq!(config.current_eclipse_window_days, 180.0);
        assert_eq!(config.solar_return.max_iterations, 50);
        assert_eq!(config.lunar_return.max_iterations, 100);
    }

    #[test]
    fn test_offset_policy() {
        let nautical = OffsetPolicy::FromLongitude.resolve(29.0).unwrap();
        assert_eq!(nautical.local_minus_utc(), 2 * 3600);
        let fixed = OffsetPolicy::Fixed(180).resolve(29.0).unwrap();
        assert_eq!(fixed.local_minus_utc(), 3 * 3600);
        assert!(OffsetPolicy::Fixed(24 * 60).resolve(0.0).is_err());
    }

    #[test]
    fn test_zero_harmonic_dropped() {
        let config = ChartConfig::new().with_harmonics([0, 5, 9]);
        assert_eq!(config.harmonics, vec![5, 9]);
    }
}
