//! Chart requests and the assembler that turns them into bundles.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use orbis_core::{
    BirthFingerprint, Body, ChartError, CivilInstant, EphemerisProvider, GeoLocation, HouseSystem,
    Result, Section,
    time::{noon, offset_from_minutes, parse_date, parse_time},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::aspects::find_aspects;
use crate::bundle::{BirthInfo, ChartDocument, DailyBundle, NatalBundle, TransitInfo};
use crate::config::{ChartConfig, OffsetPolicy};
use crate::forecast::{
    FirdariaPeriods, ReturnChart, VimshottariDasa, current_periods, eclipses_near, firdaria,
    lunar_return, secondary_progression, solar_arc, solar_return, vimshottari,
};
use crate::harmonics::{deep_harmonic_analysis, harmonic};
use crate::metrics::{
    arabic_parts, calculate_antiscia, declinations, dignity_scores, fixed_stars, horizon_positions,
    lunation_cycle, midpoint_analysis, parts::is_day_hour, part_of_fortune,
};
use crate::positions::{PositionSet, aspect_points, calculate_houses, calculate_positions};
use crate::summary::{AscendantInfo, natal_summary};

/// The reference instant of a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceInstant {
    /// Local reference date.
    pub date: NaiveDate,
    /// Local reference time.
    pub time: NaiveTime,
    /// Transit location; the birth place when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

/// Birth parameters plus an optional reference instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// Local birth date.
    pub birth_date: NaiveDate,
    /// Local birth time.
    pub birth_time: NaiveTime,
    /// Birth place.
    pub location: GeoLocation,
    /// House system; the configured default when absent.
    #[serde(default)]
    pub house_system: Option<HouseSystem>,
    /// Offset of local time from UTC in minutes east; resolved by policy when absent.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// Reference instant; the current time when absent.
    #[serde(default)]
    pub reference: Option<ReferenceInstant>,
}

impl ChartRequest {
    /// Creates a request for a birth.
    #[must_use]
    pub const fn new(birth_date: NaiveDate, birth_time: NaiveTime, location: GeoLocation) -> Self {
        Self {
            birth_date,
            birth_time,
            location,
            house_system: None,
            utc_offset_minutes: None,
            reference: None,
        }
    }

    /// Parses textual birth parameters.
    ///
    /// Unrecognized times fall back to noon.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] for a malformed date or out-of-range coordinates.
    pub fn parse(date: &str, time: &str, latitude: f64, longitude: f64) -> Result<Self> {
        Ok(Self::new(
            parse_date(date)?,
            parse_time(time),
            GeoLocation::new(latitude, longitude)?,
        ))
    }

    /// Sets the house system.
    ///
    /// The birth fingerprint does not include it: a cached natal bundle for the
    /// same birth is served with the system it was computed with.
    #[must_use]
    pub const fn with_house_system(mut self, system: HouseSystem) -> Self {
        self.house_system = Some(system);
        self
    }

    /// Sets an explicit UTC offset in minutes east.
    ///
    /// Like the house system, it is not part of the birth fingerprint.
    #[must_use]
    pub const fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }

    /// Sets the reference date and time.
    #[must_use]
    pub fn with_reference(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        let location = self.reference.take().and_then(|r| r.location);
        self.reference = Some(ReferenceInstant {
            date,
            time,
            location,
        });
        self
    }

    /// Sets the reference date at 12:00:00.
    #[must_use]
    pub fn with_reference_date(self, date: NaiveDate) -> Self {
        self.with_reference(date, noon())
    }

    /// Sets the transit location. Requires a reference instant to have been set.
    #[must_use]
    pub fn with_reference_location(mut self, location: GeoLocation) -> Self {
        if let Some(reference) = self.reference.as_mut() {
            reference.location = Some(location);
        }
        self
    }

    /// Fingerprint keying the natal cache document.
    #[must_use]
    pub fn fingerprint(&self) -> BirthFingerprint {
        BirthFingerprint::new(
            self.birth_date,
            self.birth_time,
            self.location.latitude,
            self.location.longitude,
        )
    }

    /// The UTC offset applied to both birth and reference times.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] for an out-of-range offset.
    pub fn offset(&self, policy: OffsetPolicy) -> Result<FixedOffset> {
        match self.utc_offset_minutes {
            Some(minutes) => offset_from_minutes(minutes),
            None => policy.resolve(self.location.longitude),
        }
    }

    /// Birth as a civil instant.
    ///
    /// # Errors
    /// See [`ChartRequest::offset`].
    pub fn birth_instant(&self, policy: OffsetPolicy) -> Result<CivilInstant> {
        Ok(CivilInstant::new(
            self.birth_date,
            self.birth_time,
            self.offset(policy)?,
        ))
    }

    /// Reference instant; `now` in the request offset when none was given.
    ///
    /// # Errors
    /// See [`ChartRequest::offset`].
    pub fn reference_instant(&self, now: DateTime<Utc>, policy: OffsetPolicy) -> Result<CivilInstant> {
        let offset = self.offset(policy)?;
        Ok(match &self.reference {
            Some(r) => CivilInstant::new(r.date, r.time, offset),
            None => CivilInstant::from_utc(now, offset),
        })
    }

    /// Transit location.
    #[must_use]
    pub fn reference_location(&self) -> GeoLocation {
        self.reference
            .as_ref()
            .and_then(|r| r.location)
            .unwrap_or(self.location)
    }
}

/// Computes natal and daily bundles.
///
/// Implementations are synchronous and CPU-bound; async callers should run
/// them on a blocking thread.
pub trait ChartEngine: Send + Sync + std::fmt::Debug {
    /// Computes every birth-invariant field.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] for unusable request parameters.
    fn natal(&self, request: &ChartRequest) -> Result<NatalBundle>;

    /// Computes every date-variant field from a natal bundle, fresh or cached.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] for unusable request parameters.
    fn daily(
        &self,
        request: &ChartRequest,
        natal: &NatalBundle,
        reference: &CivilInstant,
    ) -> Result<DailyBundle>;
}

/// Chart engine backed by an [`EphemerisProvider`].
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use orbis_calc::{ChartAssembler, ChartRequest};
/// use orbis_ephemeris::AnalyticEphemeris;
///
/// let assembler = ChartAssembler::new(Arc::new(AnalyticEphemeris::new()));
/// let request = ChartRequest::parse("1990-05-17", "08:30", 41.0, 29.0)?;
/// let chart = assembler.assemble(&request, chrono::Utc::now())?;
/// println!("{}", chart.natal.natal_ascendant.sign);
/// ```
#[derive(Clone)]
pub struct ChartAssembler {
    provider: Arc<dyn EphemerisProvider>,
    config: ChartConfig,
}

impl std::fmt::Debug for ChartAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartAssembler")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ChartAssembler {
    /// Creates an assembler with the default configuration.
    #[must_use]
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        Self {
            provider,
            config: ChartConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// The ephemeris provider in use.
    #[must_use]
    pub fn provider(&self) -> &dyn EphemerisProvider {
        self.provider.as_ref()
    }

    /// Computes the complete chart without any cache.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] for unusable request parameters.
    pub fn assemble(&self, request: &ChartRequest, now: DateTime<Utc>) -> Result<ChartDocument> {
        let natal = self.natal(request)?;
        let reference = request.reference_instant(now, self.config.offset_policy)?;
        let daily = self.daily(request, &natal, &reference)?;
        Ok(ChartDocument { natal, daily })
    }
}

fn valid_longitude(set: &PositionSet, body: Body) -> Result<f64> {
    set.get(&body)
        .filter(|p| p.is_valid())
        .map(|p| p.degree)
        .ok_or_else(|| ChartError::InvalidInput(format!("{body} position missing")))
}

impl ChartEngine for ChartAssembler {
    #[instrument(skip(self, request), fields(date = %request.birth_date))]
    fn natal(&self, request: &ChartRequest) -> Result<NatalBundle> {
        let birth = request.birth_instant(self.config.offset_policy)?;
        let jd = birth.julian_day();
        let location = request.location;
        let system = request.house_system.unwrap_or(self.config.house_system);
        let provider = self.provider.as_ref();
        let config = &self.config;

        let houses = calculate_houses(provider, jd, &location, system);
        let planets = calculate_positions(provider, jd, &houses, &Body::PLANETS);
        let mut points = calculate_positions(provider, jd, &houses, &Body::ADDITIONAL_POINTS);
        points.extend(calculate_positions(provider, jd, &houses, &Body::URANIANS));
        debug!(planets = planets.len(), points = points.len(), "Natal positions computed");

        let natal_aspects = find_aspects(
            &aspect_points(&[&planets, &points], Some(&houses)),
            None,
            &config.orbs,
        );
        let obliquity = provider.obliquity(jd);
        let lst = provider.local_sidereal_time(jd, location.longitude);
        let day = is_day_hour(birth.local_hour());

        let mut declination_set = planets.clone();
        declination_set.extend(points.iter().map(|(b, p)| (*b, p.clone())));

        let vimshottari_dasa: Section<VimshottariDasa> = valid_longitude(&planets, Body::Moon)
            .and_then(|moon| vimshottari(moon, jd))
            .into();
        let sun_house = planets
            .get(&Body::Sun)
            .filter(|p| p.is_valid())
            .map_or(0, |p| p.house);
        let firdaria_periods: Section<FirdariaPeriods> = firdaria(sun_house, birth.local_hour(), jd).into();

        let harmonics = deep_harmonic_analysis(&planets, &config.harmonics);
        let navamsa_chart = harmonic(&planets, 9)?;

        let bundle = NatalBundle {
            birth_info: BirthInfo::new(&birth, location, system),
            natal_ascendant: AscendantInfo::from_houses(&houses),
            natal_aspects,
            natal_azimuth_altitude: horizon_positions(&planets, &location, obliquity, lst),
            natal_fixed_stars: fixed_stars(provider, jd, &config.fixed_stars),
            natal_antiscia: calculate_antiscia(&planets, config.antiscia_orb),
            natal_dignity_scores: dignity_scores(&planets),
            natal_part_of_fortune: part_of_fortune(&planets, &houses, day).into(),
            natal_arabic_parts: arabic_parts(&planets, &houses, day).into(),
            natal_lunation_cycle: lunation_cycle(&planets).into(),
            natal_declinations: declinations(&declination_set, obliquity),
            natal_midpoint_analysis: midpoint_analysis(&planets, config.midpoint_orb),
            deep_harmonic_analysis: harmonics,
            navamsa_chart,
            vimshottari_dasa,
            firdaria_periods,
            natal_summary_interpretation: natal_summary(&planets, &points, &houses),
            eclipses_nearby_birth: eclipses_near(
                provider,
                &birth,
                config.natal_eclipse_window_days,
                config.eclipse_scan_cap,
            )
            .into(),
            natal_houses: houses,
            natal_planet_positions: planets,
            natal_additional_points: points,
        };
        info!(datetime = %bundle.birth_info.datetime, "Natal bundle assembled");
        Ok(bundle)
    }

    #[instrument(skip(self, request, natal), fields(reference = %reference.date))]
    fn daily(
        &self,
        request: &ChartRequest,
        natal: &NatalBundle,
        reference: &CivilInstant,
    ) -> Result<DailyBundle> {
        let provider = self.provider.as_ref();
        let config = &self.config;
        let birth = natal.birth_info.instant()?;
        let birth_place = natal.birth_info.location;
        let system = natal.birth_info.house_system;
        let jd = reference.julian_day();
        let location = request.reference_location();

        let transit_houses = calculate_houses(provider, jd, &location, system);
        let transit_positions = calculate_positions(provider, jd, &transit_houses, &Body::TRANSIT_SET);
        let transit_points = aspect_points(&[&transit_positions], None);
        let natal_points = aspect_points(
            &[&natal.natal_planet_positions, &natal.natal_additional_points],
            Some(&natal.natal_houses),
        );
        let transit_aspects = find_aspects(&transit_points, None, &config.orbs);
        let transit_to_natal_aspects = find_aspects(&transit_points, Some(&natal_points), &config.orbs);
        let transit_azimuth_altitude = horizon_positions(
            &transit_positions,
            &location,
            provider.obliquity(jd),
            provider.local_sidereal_time(jd, location.longitude),
        );

        let progression = secondary_progression(
            provider,
            &birth,
            &birth_place,
            system,
            reference.date,
            &config.orbs,
        );
        let solar_arc_progressions =
            solar_arc(&natal.natal_planet_positions, &progression.positions).into();

        let solar_return_chart: Section<ReturnChart> = valid_longitude(&natal.natal_planet_positions, Body::Sun)
            .and_then(|sun| {
                solar_return(provider, sun, &birth, reference, &birth_place, system, &config.solar_return)
            })
            .into();
        let lunar_return_chart: Section<ReturnChart> = valid_longitude(&natal.natal_planet_positions, Body::Moon)
            .and_then(|moon| {
                lunar_return(provider, moon, reference, &birth_place, system, &config.lunar_return)
            })
            .into();
        if let Some(error) = solar_return_chart.error().or(lunar_return_chart.error()) {
            debug!(error, "Return chart unavailable");
        }

        let bundle = DailyBundle {
            transit_info: TransitInfo {
                datetime: reference.format_local(),
                location,
                julian_day: jd,
            },
            transit_positions,
            transit_houses,
            transit_aspects,
            transit_azimuth_altitude,
            transit_to_natal_aspects,
            eclipses_nearby_current: eclipses_near(
                provider,
                reference,
                config.current_eclipse_window_days,
                config.eclipse_scan_cap,
            )
            .into(),
            secondary_progressions: progression.positions,
            progressed_houses: progression.houses,
            progressed_aspects: progression.aspects,
            progressed_moon_phase: progression.moon_phase,
            solar_arc_progressions,
            solar_return_chart,
            lunar_return_chart,
            current_periods: current_periods(&natal.vimshottari_dasa, &natal.firdaria_periods, jd),
        };
        info!(datetime = %bundle.transit_info.datetime, "Daily bundle assembled");
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::ZodiacSign;
    use orbis_ephemeris::AnalyticEphemeris;

    fn assembler() -> ChartAssembler {
        ChartAssembler::new(Arc::new(AnalyticEphemeris::new()))
    }

    fn request() -> ChartRequest {
        ChartRequest::parse("2000-01-01", "12:00", 41.0, 29.0)
            .unwrap()
            .with_utc_offset(180)
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn test_request_parsing() {
        let r = ChartRequest::parse("1990-05-17", "bogus", 41.0, 29.0).unwrap();
        assert_eq!(r.birth_time, noon());
        assert!(ChartRequest::parse("17/05/1990", "08:00", 41.0, 29.0).is_err());
        assert!(ChartRequest::parse("1990-05-17", "08:00", 91.0, 29.0).is_err());

        // 29 E resolves to the UTC+2 nautical zone.
        let offset = r.offset(OffsetPolicy::FromLongitude).unwrap();
        assert_eq!(offset.local_minus_utc(), 7200);
        assert_eq!(r.reference_location(), r.location);
    }

    #[test]
    fn test_deserialized_request_rejects_bad_coordinates() {
        let json = r#"{"birth_date":"1990-05-17","birth_time":"08:30:00",
            "location":{"latitude":41.0,"longitude":29.0}}"#;
        let r: ChartRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r.location, GeoLocation::new(41.0, 29.0).unwrap());

        let bad = r#"{"birth_date":"1990-05-17","birth_time":"08:30:00",
            "location":{"latitude":95.0,"longitude":500.0}}"#;
        assert!(serde_json::from_str::<ChartRequest>(bad).is_err());

        let bad_reference = r#"{"birth_date":"1990-05-17","birth_time":"08:30:00",
            "location":{"latitude":41.0,"longitude":29.0},
            "reference":{"date":"2024-06-01","time":"12:00:00",
                "location":{"latitude":-91.0,"longitude":0.0}}}"#;
        assert!(serde_json::from_str::<ChartRequest>(bad_reference).is_err());
    }

    #[test]
    fn test_extreme_utc_offset_is_invalid_input() {
        let r = ChartRequest::parse("1990-05-17", "08:30", 41.0, 29.0)
            .unwrap()
            .with_utc_offset(i32::MAX);
        assert!(matches!(
            r.birth_instant(OffsetPolicy::default()),
            Err(ChartError::InvalidInput(_))
        ));
        assert!(assembler().natal(&r).is_err());
    }

    #[test]
    fn test_reference_defaults_to_now() {
        let r = ChartRequest::parse("1990-05-17", "08:00", 41.0, 29.0).unwrap().with_utc_offset(0);
        let now = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
            .and_utc();
        let reference = r.reference_instant(now, OffsetPolicy::default()).unwrap();
        assert_eq!(reference.format_local(), "2025-03-03 09:15:00");
    }

    #[test]
    fn test_natal_scenario() {
        let natal = assembler().natal(&request()).unwrap();
        let sun = &natal.natal_planet_positions[&Body::Sun];
        assert_eq!(sun.sign, ZodiacSign::Capricorn);
        assert!((1..=12).contains(&sun.house));
        assert!(natal.natal_houses.is_valid());
        assert_eq!(natal.natal_planet_positions.len(), 10);
        assert!(natal.natal_additional_points[&Body::Chiron].error.is_some());
        assert!(natal.natal_additional_points[&Body::MeanNode].is_valid());
        assert!(natal.deep_harmonic_analysis.contains_key("H9"));
        assert_eq!(natal.navamsa_chart, natal.deep_harmonic_analysis["H9"].planet_positions);
        assert!(natal.vimshottari_dasa.ready().is_some());
        assert!(natal.firdaria_periods.ready().is_some());
        assert!(natal.natal_part_of_fortune.ready().is_some());
        assert_eq!(natal.birth_info.datetime, "2000-01-01 12:00:00");
    }

    #[test]
    fn test_natal_is_deterministic() {
        let a = assembler();
        let first = serde_json::to_string(&a.natal(&request()).unwrap()).unwrap();
        let second = serde_json::to_string(&a.natal(&request()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_polar_birth_degrades_to_house_one() {
        let polar = ChartRequest::parse("2000-01-01", "12:00", 70.0, 25.0)
            .unwrap()
            .with_house_system(HouseSystem::Placidus);
        let natal = assembler().natal(&polar).unwrap();
        assert!(!natal.natal_houses.is_valid());
        assert!(natal.natal_planet_positions.values().all(|p| p.house == 1));
        assert!(natal.natal_part_of_fortune.error().is_some());
    }

    #[test]
    fn test_daily_bundle() {
        let a = assembler();
        let request = request();
        let chart = a.assemble(&request, Utc::now()).unwrap();
        let daily = &chart.daily;
        assert!(daily.transit_info.datetime.starts_with("2024-06-01"));
        assert_eq!(daily.transit_positions.len(), Body::TRANSIT_SET.len());
        assert!(!daily.transit_to_natal_aspects.is_empty());
        assert!(daily.solar_return_chart.ready().is_some());
        assert!(daily.lunar_return_chart.ready().is_some());
        assert!(daily.solar_arc_progressions.ready().is_some());

        let now = from_jd(daily.transit_info.julian_day);
        let dasa = daily.current_periods.vimshottari.ready().unwrap();
        assert!(dasa.period.main_period_start <= now && now < dasa.period.main_period_end);
        assert!(dasa.period.sub_period_start <= now && now < dasa.period.sub_period_end);
        let firdaria = daily.current_periods.firdaria.ready().unwrap();
        assert!(firdaria.main_period_start <= now && now < firdaria.main_period_end);
        assert!(firdaria.sub_period_start <= now && now < firdaria.sub_period_end);

        let json = serde_json::to_value(&chart).unwrap();
        assert!(json.get("natal_planet_positions").is_some());
        assert!(json.get("transit_positions").is_some());
    }

    #[test]
    fn test_reference_before_birth_fails_in_isolation() {
        let a = assembler();
        let request = request().with_reference_date(NaiveDate::from_ymd_opt(1999, 6, 1).unwrap());
        let chart = a.assemble(&request, Utc::now()).unwrap();
        assert!(chart.daily.current_periods.vimshottari.error().is_some());
        assert!(chart.daily.current_periods.firdaria.error().is_some());
        assert!(!chart.daily.transit_positions.is_empty());
    }

    fn from_jd(jd: f64) -> DateTime<Utc> {
        orbis_core::time::from_julian_day(jd).unwrap()
    }
}
