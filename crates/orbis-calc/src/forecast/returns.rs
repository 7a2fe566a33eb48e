//! Solar and lunar return charts.

use chrono::{Datelike, NaiveDate};
use orbis_core::{
    Body, ChartError, CivilInstant, EphemerisProvider, GeoLocation, HouseCuspSet, HouseSystem,
    Result, ZodiacSign, round_to,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::forecast::solver::RootSolver;
use crate::positions::{PositionSet, calculate_houses, calculate_positions};
use crate::summary::AscendantInfo;

/// Days before the birthday anniversary at which the solar return search starts.
const SOLAR_LEAD_DAYS: f64 = 2.0;
/// Days before the reference instant at which the lunar return search starts.
const LUNAR_LEAD_DAYS: f64 = 30.0;

/// Chart cast for the instant a body returns to its natal longitude.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnChart {
    /// Local time of the return, `YYYY-MM-DD HH:MM:SS`.
    pub return_date: String,
    /// Julian day (UT) of the return.
    pub jd: f64,
    /// Sign of the return ascendant.
    pub ascendant_sign: ZodiacSign,
    /// Return ascendant, two decimals.
    pub ascendant_degree: f64,
    /// Location the chart is cast for.
    pub location: GeoLocation,
    /// Planets and the true node.
    pub planet_positions: PositionSet,
    /// Asteroids, mean node and Liliths.
    pub additional_points: PositionSet,
    /// Houses at the return.
    pub houses: HouseCuspSet,
}

/// Birthday anniversary on or after `reference`; Feb 29 falls on Mar 1 in common years.
#[must_use]
pub fn next_anniversary(birth: NaiveDate, reference: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
            .unwrap_or(reference)
    };
    let this_year = in_year(reference.year());
    if this_year < reference {
        in_year(reference.year() + 1)
    } else {
        this_year
    }
}

/// Finds the next solar return on or after the birthday anniversary in the reference year.
///
/// # Errors
/// Propagates solver failures ([`ChartError::NonConvergence`], [`ChartError::Stalled`])
/// and provider errors for the Sun.
#[instrument(skip(provider, birth, reference, location, solver), fields(reference = %reference.date))]
pub fn solar_return(
    provider: &dyn EphemerisProvider,
    natal_sun: f64,
    birth: &CivilInstant,
    reference: &CivilInstant,
    location: &GeoLocation,
    system: HouseSystem,
    solver: &RootSolver,
) -> Result<ReturnChart> {
    let anniversary = next_anniversary(birth.date, reference.date);
    let start = CivilInstant::new(anniversary, birth.time, birth.offset).julian_day() - SOLAR_LEAD_DAYS;
    debug!(%anniversary, start, "Searching solar return");
    let jd = find_return(provider, Body::Sun, natal_sun, start, solver)?;
    return_chart(provider, jd, reference, location, system)
}

/// Finds the first lunar return after a point 30 days before the reference instant.
///
/// # Errors
/// Propagates solver failures and provider errors for the Moon.
#[instrument(skip(provider, reference, location, solver), fields(reference = %reference.date))]
pub fn lunar_return(
    provider: &dyn EphemerisProvider,
    natal_moon: f64,
    reference: &CivilInstant,
    location: &GeoLocation,
    system: HouseSystem,
    solver: &RootSolver,
) -> Result<ReturnChart> {
    let start = reference.julian_day() - LUNAR_LEAD_DAYS;
    let jd = find_return(provider, Body::Moon, natal_moon, start, solver)?;
    return_chart(provider, jd, reference, location, system)
}

fn find_return(
    provider: &dyn EphemerisProvider,
    body: Body,
    target: f64,
    start: f64,
    solver: &RootSolver,
) -> Result<f64> {
    solver.solve(start, target, |jd| {
        let raw = provider.position(jd, body)?;
        Ok((raw.longitude, raw.speed))
    })
}

fn return_chart(
    provider: &dyn EphemerisProvider,
    jd: f64,
    reference: &CivilInstant,
    location: &GeoLocation,
    system: HouseSystem,
) -> Result<ReturnChart> {
    let local = CivilInstant::from_julian_day(jd, reference.offset)
        .ok_or_else(|| ChartError::InvalidInput(format!("Return instant out of range: {jd}")))?;
    let houses = calculate_houses(provider, jd, location, system);
    let points: Vec<Body> = Body::ADDITIONAL_POINTS
        .into_iter()
        .filter(|b| *b != Body::TrueNode)
        .collect();
    let ascendant = AscendantInfo::from_houses(&houses);

    Ok(ReturnChart {
        return_date: local.format_local(),
        jd: round_to(jd, 6),
        ascendant_sign: ascendant.sign,
        ascendant_degree: ascendant.degree,
        location: *location,
        planet_positions: calculate_positions(provider, jd, &houses, &Body::TRANSIT_SET),
        additional_points: calculate_positions(provider, jd, &houses, &points),
        houses,
    })
}
