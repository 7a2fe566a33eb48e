//! Temporal forecast engine.
//!
//! - [`progression`] - Secondary progressions and solar arc directions
//! - [`returns`] - Solar and lunar return charts
//! - [`periods`] - Vimshottari and Firdaria period tables
//! - [`eclipses`] - Eclipse windows
//! - [`solver`] - The shared return-instant search

pub mod eclipses;
pub mod periods;
pub mod progression;
pub mod returns;
pub mod solver;

pub use eclipses::{EclipseDetails, EclipseRecord, eclipses_near, scan_eclipses};
pub use periods::{
    CurrentPeriods, DasaState, FirdariaPeriods, PeriodSpan, PeriodState, Ruler, VimshottariDasa,
    current_periods, firdaria, vimshottari,
};
pub use progression::{SecondaryProgression, SolarArcPosition, secondary_progression, solar_arc};
pub use returns::{ReturnChart, lunar_return, solar_return};
pub use solver::RootSolver;
