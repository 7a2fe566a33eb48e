//! Typed natal and daily bundles.
//!
//! Field names are the stored document field names: each top-level field of a
//! bundle becomes one JSON string in the cache.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use orbis_core::{
    Body, CivilInstant, GeoLocation, HouseCuspSet, HouseSystem, Result, Section,
    time::offset_from_minutes,
};
use serde::{Deserialize, Serialize};

use crate::aspects::Aspect;
use crate::forecast::{
    CurrentPeriods, EclipseRecord, FirdariaPeriods, ReturnChart, SolarArcPosition, VimshottariDasa,
};
use crate::harmonics::{HarmonicChart, HarmonicPosition};
use crate::metrics::{
    AntisciaEntry, ArabicPart, Declination, DignityScore, HorizonPosition, LunationPhase, Midpoint,
    ProgressedMoonPhase, StarPosition,
};
use crate::positions::PositionSet;
use crate::summary::{AscendantInfo, NatalSummary};

/// Birth parameters the natal bundle was computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BirthInfo {
    /// Local birth time, `YYYY-MM-DD HH:MM:SS`.
    pub datetime: String,
    /// Local birth date.
    pub date: NaiveDate,
    /// Local birth time.
    pub time: NaiveTime,
    /// Birth place.
    pub location: GeoLocation,
    /// House system of every chart derived from this birth.
    pub house_system: HouseSystem,
    /// Offset of local time from UTC, minutes east.
    pub utc_offset_minutes: i32,
    /// Julian day (UT) of birth.
    pub julian_day: f64,
}

impl BirthInfo {
    pub(crate) fn new(birth: &CivilInstant, location: GeoLocation, house_system: HouseSystem) -> Self {
        Self {
            datetime: birth.format_local(),
            date: birth.date,
            time: birth.time,
            location,
            house_system,
            utc_offset_minutes: birth.offset.local_minus_utc() / 60,
            julian_day: birth.julian_day(),
        }
    }

    /// The birth as a civil instant.
    ///
    /// # Errors
    /// Returns [`orbis_core::ChartError::InvalidInput`] for a corrupt stored offset.
    pub fn instant(&self) -> Result<CivilInstant> {
        Ok(CivilInstant::new(
            self.date,
            self.time,
            offset_from_minutes(self.utc_offset_minutes)?,
        ))
    }
}

/// Reference parameters the daily bundle was computed for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitInfo {
    /// Local reference time, `YYYY-MM-DD HH:MM:SS`.
    pub datetime: String,
    /// Observer location for transits.
    pub location: GeoLocation,
    /// Julian day (UT) of the reference instant.
    pub julian_day: f64,
}

/// Everything that depends only on the birth fingerprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NatalBundle {
    /// Birth parameters.
    pub birth_info: BirthInfo,
    /// Cusps and angles, zeroed with an error on failure.
    pub natal_houses: HouseCuspSet,
    /// Ascendant sign, degree and decan.
    pub natal_ascendant: AscendantInfo,
    /// Sun through Pluto.
    pub natal_planet_positions: PositionSet,
    /// Asteroids, nodes, Liliths and Uranian points.
    pub natal_additional_points: PositionSet,
    /// Aspects among planets, points and angles.
    pub natal_aspects: Vec<Aspect>,
    /// Azimuth and altitude of the planets.
    pub natal_azimuth_altitude: BTreeMap<Body, HorizonPosition>,
    /// Fixed stars at birth.
    pub natal_fixed_stars: BTreeMap<String, StarPosition>,
    /// Antiscia of the planets.
    pub natal_antiscia: BTreeMap<Body, AntisciaEntry>,
    /// Essential dignity of the classical planets.
    pub natal_dignity_scores: BTreeMap<Body, DignityScore>,
    /// Part of Fortune.
    pub natal_part_of_fortune: Section<ArabicPart>,
    /// All Arabic parts.
    pub natal_arabic_parts: Section<BTreeMap<String, ArabicPart>>,
    /// Sun-Moon phase at birth.
    pub natal_lunation_cycle: Section<LunationPhase>,
    /// Declinations of planets and points.
    pub natal_declinations: BTreeMap<Body, Declination>,
    /// Planetary midpoints with their hits.
    pub natal_midpoint_analysis: BTreeMap<String, Midpoint>,
    /// Harmonic charts keyed `H<n>`.
    pub deep_harmonic_analysis: BTreeMap<String, HarmonicChart>,
    /// The ninth harmonic.
    pub navamsa_chart: BTreeMap<Body, HarmonicPosition>,
    /// Vimshottari table.
    pub vimshottari_dasa: Section<VimshottariDasa>,
    /// Firdaria table.
    pub firdaria_periods: Section<FirdariaPeriods>,
    /// Structural overview.
    pub natal_summary_interpretation: NatalSummary,
    /// Eclipses within the natal window.
    pub eclipses_nearby_birth: Section<Vec<EclipseRecord>>,
}

/// Everything that depends on the reference date as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBundle {
    /// Reference parameters.
    pub transit_info: TransitInfo,
    /// Transiting planets and the true node.
    pub transit_positions: PositionSet,
    /// Houses at the reference instant and location.
    pub transit_houses: HouseCuspSet,
    /// Aspects among transiting bodies.
    pub transit_aspects: Vec<Aspect>,
    /// Azimuth and altitude of the transiting bodies.
    pub transit_azimuth_altitude: BTreeMap<Body, HorizonPosition>,
    /// Transits against natal planets, points and angles.
    pub transit_to_natal_aspects: Vec<Aspect>,
    /// Eclipses within the current window.
    pub eclipses_nearby_current: Section<Vec<EclipseRecord>>,
    /// Progressed positions.
    pub secondary_progressions: PositionSet,
    /// Progressed houses at the birth place.
    pub progressed_houses: HouseCuspSet,
    /// Aspects among progressed positions.
    pub progressed_aspects: Vec<Aspect>,
    /// Progressed lunar phase.
    pub progressed_moon_phase: Section<ProgressedMoonPhase>,
    /// Natal planets directed by the solar arc.
    pub solar_arc_progressions: Section<BTreeMap<Body, SolarArcPosition>>,
    /// Next solar return.
    pub solar_return_chart: Section<ReturnChart>,
    /// Current lunar return.
    pub lunar_return_chart: Section<ReturnChart>,
    /// Dasa and Firdaria periods running now.
    pub current_periods: CurrentPeriods,
}

/// A complete chart: natal and daily fields side by side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    /// Birth-invariant fields.
    #[serde(flatten)]
    pub natal: NatalBundle,
    /// Date-variant fields.
    #[serde(flatten)]
    pub daily: DailyBundle,
}
