//! Planetary period tables: Vimshottari dasa and Firdaria.
//!
//! Both systems partition a lifetime into ruler periods drawn from a fixed
//! weighted cycle. A period is subdivided by the same cycle, rotated to start
//! at the period's own ruler, with durations proportional to the ruler weights.
//! All arithmetic runs on Julian days; instants are produced only for output.

use std::fmt;

use chrono::{DateTime, Utc};
use orbis_core::{ChartError, Result, Section, normalize_degrees, round_to, time::from_julian_day};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::parts::is_day_hour;

/// Length of a period year in days.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Horizon of the Vimshottari future timeline, in years.
const TIMELINE_YEARS: f64 = 5.0;
/// Maximum entries in the Vimshottari future timeline.
const TIMELINE_LIMIT: usize = 15;
/// Number of whole Vimshottari cycles listed in the natal timeline.
const DASA_CYCLES: usize = 2;

/// A period ruler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ruler {
    /// The Sun.
    Sun,
    /// The Moon.
    Moon,
    /// Mercury.
    Mercury,
    /// Venus.
    Venus,
    /// Mars.
    Mars,
    /// Jupiter.
    Jupiter,
    /// Saturn.
    Saturn,
    /// North lunar node.
    Rahu,
    /// South lunar node.
    Ketu,
}

impl fmt::Display for Ruler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Span {
    ruler: Ruler,
    start: f64,
    end: f64,
}

impl Span {
    fn contains(&self, jd: f64) -> bool {
        self.start <= jd && jd < self.end
    }

    /// Spans that began before birth are reported from birth.
    fn from_birth(self, birth_jd: f64) -> Self {
        Self {
            start: self.start.max(birth_jd),
            ..self
        }
    }
}

#[derive(Debug)]
struct WeightedCycle {
    sequence: &'static [(Ruler, f64)],
    total_years: f64,
}

impl WeightedCycle {
    fn years(&self, ruler: Ruler) -> f64 {
        self.sequence
            .iter()
            .find(|(r, _)| *r == ruler)
            .map_or(0.0, |(_, y)| *y)
    }

    fn rotated(&self, from: Ruler) -> impl Iterator<Item = (Ruler, f64)> + '_ {
        let at = self.sequence.iter().position(|(r, _)| *r == from).unwrap_or(0);
        self.sequence[at..]
            .iter()
            .chain(&self.sequence[..at])
            .copied()
    }

    fn cycle_days(&self) -> f64 {
        self.total_years * DAYS_PER_YEAR
    }

    /// Whole periods laid end to end from `epoch`, starting with `first`.
    fn periods(&self, epoch: f64, first: Ruler, cycles: usize) -> Vec<Span> {
        let mut start = epoch;
        (0..cycles)
            .flat_map(|_| self.rotated(first))
            .map(|(ruler, years)| {
                let end = start + years * DAYS_PER_YEAR;
                let span = Span { ruler, start, end };
                start = end;
                span
            })
            .collect()
    }

    /// The whole period containing `at`, counting from `epoch` with `first`.
    fn locate(&self, epoch: f64, first: Ruler, at: f64) -> Option<Span> {
        if at < epoch {
            return None;
        }
        let skipped = ((at - epoch) / self.cycle_days()).floor();
        let cycle_start = epoch + skipped * self.cycle_days();
        let mut spans = self.periods(cycle_start, first, 1);
        if let Some(last) = spans.last_mut() {
            last.end = cycle_start + self.cycle_days();
        }
        spans.into_iter().find(|s| s.contains(at))
    }

    /// Proportional sub-periods of `parent`, tiling it exactly.
    fn subdivide(&self, parent: Span) -> Vec<Span> {
        let length = parent.end - parent.start;
        let mut start = parent.start;
        let mut spans: Vec<Span> = self
            .rotated(parent.ruler)
            .map(|(ruler, years)| {
                let end = start + length * years / self.total_years;
                let span = Span { ruler, start, end };
                start = end;
                span
            })
            .collect();
        if let Some(last) = spans.last_mut() {
            last.end = parent.end;
        }
        spans
    }
}

static VIMSHOTTARI: WeightedCycle = WeightedCycle {
    sequence: &[
        (Ruler::Ketu, 7.0),
        (Ruler::Venus, 20.0),
        (Ruler::Sun, 6.0),
        (Ruler::Moon, 10.0),
        (Ruler::Mars, 7.0),
        (Ruler::Rahu, 18.0),
        (Ruler::Jupiter, 16.0),
        (Ruler::Saturn, 19.0),
        (Ruler::Mercury, 17.0),
    ],
    total_years: 120.0,
};

static FIRDARIA_DAY: WeightedCycle = WeightedCycle {
    sequence: &[
        (Ruler::Sun, 10.0),
        (Ruler::Venus, 8.0),
        (Ruler::Mercury, 13.0),
        (Ruler::Moon, 9.0),
        (Ruler::Saturn, 11.0),
        (Ruler::Jupiter, 12.0),
        (Ruler::Mars, 7.0),
    ],
    total_years: 72.0,
};

static FIRDARIA_NIGHT: WeightedCycle = WeightedCycle {
    sequence: &[
        (Ruler::Moon, 9.0),
        (Ruler::Saturn, 11.0),
        (Ruler::Jupiter, 12.0),
        (Ruler::Mars, 7.0),
        (Ruler::Sun, 10.0),
        (Ruler::Venus, 8.0),
        (Ruler::Mercury, 13.0),
    ],
    total_years: 72.0,
};

const NAKSHATRAS: [&str; 27] = [
    "Ashwini",
    "Bharani",
    "Krittika",
    "Rohini",
    "Mrigashira",
    "Ardra",
    "Punarvasu",
    "Pushya",
    "Ashlesha",
    "Magha",
    "Purva Phalguni",
    "Uttara Phalguni",
    "Hasta",
    "Chitra",
    "Swati",
    "Vishakha",
    "Anuradha",
    "Jyeshtha",
    "Mula",
    "Purva Ashadha",
    "Uttara Ashadha",
    "Shravana",
    "Dhanishta",
    "Shatabhisha",
    "Purva Bhadrapada",
    "Uttara Bhadrapada",
    "Revati",
];

const NAKSHATRA_SPAN: f64 = 360.0 / 27.0;

fn instant(jd: f64) -> Result<DateTime<Utc>> {
    from_julian_day(jd).ok_or_else(|| ChartError::InvalidInput(format!("Julian day out of range: {jd}")))
}

fn remaining_days(end: f64, now: f64) -> i64 {
    (end - now).floor() as i64
}

/// A ruler period with its boundaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodSpan {
    /// Ruler of the period.
    pub ruler: Ruler,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant, exclusive.
    pub end: DateTime<Utc>,
}

impl PeriodSpan {
    fn from_span(span: Span) -> Result<Self> {
        Ok(Self {
            ruler: span.ruler,
            start: instant(span.start)?,
            end: instant(span.end)?,
        })
    }
}

/// The main and sub period running at an instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodState {
    /// Ruler of the main period.
    pub main_ruler: Ruler,
    /// Ruler of the sub period.
    pub sub_ruler: Ruler,
    /// Start of the main period.
    pub main_period_start: DateTime<Utc>,
    /// End of the main period.
    pub main_period_end: DateTime<Utc>,
    /// Start of the sub period.
    pub sub_period_start: DateTime<Utc>,
    /// End of the sub period.
    pub sub_period_end: DateTime<Utc>,
    /// Whole days left in the main period.
    pub remaining_days_in_main_period: i64,
    /// Whole days left in the sub period.
    pub remaining_days_in_sub_period: i64,
}

impl PeriodState {
    fn new(main: Span, sub: Span, now: f64) -> Result<Self> {
        Ok(Self {
            main_ruler: main.ruler,
            sub_ruler: sub.ruler,
            main_period_start: instant(main.start)?,
            main_period_end: instant(main.end)?,
            sub_period_start: instant(sub.start)?,
            sub_period_end: instant(sub.end)?,
            remaining_days_in_main_period: remaining_days(main.end, now),
            remaining_days_in_sub_period: remaining_days(sub.end, now),
        })
    }
}

/// Lunar mansion of the natal Moon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nakshatra {
    /// Mansion name.
    pub name: String,
    /// Dasa lord of the mansion.
    pub lord: Ruler,
    /// Quarter, 1 to 4.
    pub pada: u8,
    /// Moon's offset into the mansion, two decimals.
    pub degree: f64,
    /// Share of the mansion already traversed, percent.
    pub percentage: f64,
}

/// A maha dasa in the natal timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MahaDasa {
    /// Ruler and boundaries.
    #[serde(flatten)]
    pub span: PeriodSpan,
    /// Length in years, two decimals.
    pub years: f64,
    /// Whether the period was already running at birth.
    pub partial: bool,
}

/// An upcoming sub period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// `Maha-Bhukti` label.
    pub period: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
}

/// Vimshottari position at an instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DasaState {
    /// Maha dasa and bhukti.
    #[serde(flatten)]
    pub period: PeriodState,
    /// Ruler of the pratyantar dasa.
    pub pratyantar_ruler: Ruler,
    /// Start of the pratyantar.
    pub pratyantar_start: DateTime<Utc>,
    /// End of the pratyantar.
    pub pratyantar_end: DateTime<Utc>,
    /// Whole days left in the pratyantar.
    pub remaining_days_in_pratyantar: i64,
    /// `Maha-Bhukti-Pratyantar` label.
    pub current_period: String,
    /// Sub periods starting within the next five years.
    pub future_timeline: Vec<TimelineEntry>,
    /// Every bhukti of the running maha dasa.
    pub all_bhuktis_in_current_dasa: Vec<PeriodSpan>,
}

/// Natal Vimshottari table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VimshottariDasa {
    /// Mansion of the natal Moon.
    pub nakshatra: Nakshatra,
    /// Years of the first maha dasa left at birth, two decimals.
    pub balance_years: f64,
    /// Julian day of birth.
    pub birth_jd: f64,
    /// Julian day the first maha dasa would have begun.
    pub cycle_start_jd: f64,
    /// Maha dasas over two full cycles.
    pub maha_dasas: Vec<MahaDasa>,
}

/// Builds the Vimshottari table from the natal Moon.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] for a non-finite longitude or a birth
/// outside the representable range.
pub fn vimshottari(moon_longitude: f64, birth_jd: f64) -> Result<VimshottariDasa> {
    if !moon_longitude.is_finite() {
        return Err(ChartError::InvalidInput("Moon longitude is not finite".to_string()));
    }
    let lon = normalize_degrees(moon_longitude);
    let index = ((lon / NAKSHATRA_SPAN) as usize).min(26);
    let traversed = lon - index as f64 * NAKSHATRA_SPAN;
    let lord = VIMSHOTTARI.sequence[index % 9].0;
    let elapsed = traversed / NAKSHATRA_SPAN;
    let lord_years = VIMSHOTTARI.years(lord);
    let balance_years = (1.0 - elapsed) * lord_years;
    let cycle_start_jd = birth_jd - elapsed * lord_years * DAYS_PER_YEAR;

    let maha_dasas = VIMSHOTTARI
        .periods(cycle_start_jd, lord, DASA_CYCLES)
        .into_iter()
        .enumerate()
        .map(|(i, span)| -> Result<MahaDasa> {
            let years = (span.end - span.start) / DAYS_PER_YEAR;
            Ok(MahaDasa {
                span: PeriodSpan::from_span(span.from_birth(birth_jd))?,
                years: round_to(if i == 0 { balance_years } else { years }, 2),
                partial: i == 0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(%lord, balance_years, "Vimshottari table built");
    Ok(VimshottariDasa {
        nakshatra: Nakshatra {
            name: NAKSHATRAS[index].to_string(),
            lord,
            pada: ((traversed / (NAKSHATRA_SPAN / 4.0)) as u8).min(3) + 1,
            degree: round_to(traversed, 2),
            percentage: round_to(elapsed * 100.0, 2),
        },
        balance_years: round_to(balance_years, 2),
        birth_jd,
        cycle_start_jd,
        maha_dasas,
    })
}

impl VimshottariDasa {
    /// Resolves maha dasa, bhukti and pratyantar at `now_jd`.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] when `now_jd` precedes birth.
    pub fn state_at(&self, now_jd: f64) -> Result<DasaState> {
        if now_jd < self.birth_jd {
            return Err(ChartError::InvalidInput(
                "Reference instant precedes birth".to_string(),
            ));
        }
        let not_found = || ChartError::Other(format!("No dasa period covers JD {now_jd}"));
        let maha = VIMSHOTTARI
            .locate(self.cycle_start_jd, self.nakshatra.lord, now_jd)
            .ok_or_else(not_found)?;
        let bhuktis = VIMSHOTTARI.subdivide(maha);
        let bhukti = bhuktis.iter().copied().find(|s| s.contains(now_jd)).ok_or_else(not_found)?;
        let pratyantar = VIMSHOTTARI
            .subdivide(bhukti)
            .into_iter()
            .find(|s| s.contains(now_jd))
            .ok_or_else(not_found)?;

        let birth = self.birth_jd;
        Ok(DasaState {
            period: PeriodState::new(maha.from_birth(birth), bhukti.from_birth(birth), now_jd)?,
            pratyantar_ruler: pratyantar.ruler,
            pratyantar_start: instant(pratyantar.from_birth(birth).start)?,
            pratyantar_end: instant(pratyantar.end)?,
            remaining_days_in_pratyantar: remaining_days(pratyantar.end, now_jd),
            current_period: format!("{}-{}-{}", maha.ruler, bhukti.ruler, pratyantar.ruler),
            future_timeline: self.future_timeline(maha, now_jd)?,
            all_bhuktis_in_current_dasa: bhuktis
                .into_iter()
                .map(|s| PeriodSpan::from_span(s.from_birth(birth)))
                .collect::<Result<_>>()?,
        })
    }

    fn future_timeline(&self, current: Span, now_jd: f64) -> Result<Vec<TimelineEntry>> {
        let horizon = now_jd + TIMELINE_YEARS * DAYS_PER_YEAR;
        let mut mahas = vec![current];
        let mut last = current;
        while last.end < horizon {
            let next_ruler = VIMSHOTTARI.rotated(last.ruler).nth(1).map_or(last.ruler, |(r, _)| r);
            let end = last.end + VIMSHOTTARI.years(next_ruler) * DAYS_PER_YEAR;
            last = Span {
                ruler: next_ruler,
                start: last.end,
                end,
            };
            mahas.push(last);
        }

        mahas
            .into_iter()
            .flat_map(|maha| {
                VIMSHOTTARI
                    .subdivide(maha)
                    .into_iter()
                    .map(move |bhukti| (maha.ruler, bhukti))
            })
            .filter(|(_, bhukti)| bhukti.start > now_jd && bhukti.start < horizon)
            .take(TIMELINE_LIMIT)
            .map(|(maha, bhukti)| -> Result<TimelineEntry> {
                Ok(TimelineEntry {
                    period: format!("{maha}-{}", bhukti.ruler),
                    start: instant(bhukti.start)?,
                    end: instant(bhukti.end)?,
                })
            })
            .collect()
    }
}

/// Natal Firdaria table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirdariaPeriods {
    /// Whether the day sequence applies.
    pub day_birth: bool,
    /// Julian day of birth.
    pub birth_jd: f64,
    /// Main periods of the first 72-year cycle.
    pub periods: Vec<PeriodSpan>,
}

/// Day birth when the Sun is above the horizon (houses 7 to 12).
///
/// A Sun without a house falls back to the local clock.
#[must_use]
pub fn is_day_birth(sun_house: u8, local_hour: u32) -> bool {
    match sun_house {
        7..=12 => true,
        1..=6 => false,
        _ => is_day_hour(local_hour),
    }
}

/// Builds the Firdaria table.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] for a birth outside the representable range.
pub fn firdaria(sun_house: u8, local_hour: u32, birth_jd: f64) -> Result<FirdariaPeriods> {
    let day_birth = is_day_birth(sun_house, local_hour);
    let cycle = firdaria_cycle(day_birth);
    let periods = cycle
        .periods(birth_jd, cycle.sequence[0].0, 1)
        .into_iter()
        .map(PeriodSpan::from_span)
        .collect::<Result<_>>()?;
    Ok(FirdariaPeriods {
        day_birth,
        birth_jd,
        periods,
    })
}

fn firdaria_cycle(day_birth: bool) -> &'static WeightedCycle {
    if day_birth { &FIRDARIA_DAY } else { &FIRDARIA_NIGHT }
}

impl FirdariaPeriods {
    /// Resolves the main and sub period at `now_jd`.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidInput`] when `now_jd` precedes birth.
    pub fn state_at(&self, now_jd: f64) -> Result<PeriodState> {
        if now_jd < self.birth_jd {
            return Err(ChartError::InvalidInput(
                "Reference instant precedes birth".to_string(),
            ));
        }
        let not_found = || ChartError::Other(format!("No firdaria period covers JD {now_jd}"));
        let cycle = firdaria_cycle(self.day_birth);
        let main = cycle
            .locate(self.birth_jd, cycle.sequence[0].0, now_jd)
            .ok_or_else(not_found)?;
        let sub = cycle
            .subdivide(main)
            .into_iter()
            .find(|s| s.contains(now_jd))
            .ok_or_else(not_found)?;
        PeriodState::new(main, sub, now_jd)
    }
}

/// Periods running at the reference instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentPeriods {
    /// Vimshottari state.
    pub vimshottari: Section<DasaState>,
    /// Firdaria state.
    pub firdaria: Section<PeriodState>,
}

/// Resolves both natal tables at `now_jd`; a failed table stays failed.
#[must_use]
pub fn current_periods(
    vimshottari: &Section<VimshottariDasa>,
    firdaria: &Section<FirdariaPeriods>,
    now_jd: f64,
) -> CurrentPeriods {
    CurrentPeriods {
        vimshottari: match vimshottari {
            Section::Ready(table) => table.state_at(now_jd).into(),
            Section::Failed { error } => Section::failed(error),
        },
        firdaria: match firdaria {
            Section::Ready(table) => table.state_at(now_jd).into(),
            Section::Failed { error } => Section::failed(error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIRTH: f64 = 2_451_545.0;

    fn assert_current(start: DateTime<Utc>, end: DateTime<Utc>, now: f64) {
        let now = from_julian_day(now).unwrap();
        assert!(start <= now && now < end, "{start} <= {now} < {end}");
    }

    #[test]
    fn test_nakshatra_and_balance() {
        let table = vimshottari(125.0, BIRTH).unwrap();
        assert_eq!(table.nakshatra.name, "Magha");
        assert_eq!(table.nakshatra.lord, Ruler::Ketu);
        assert_eq!(table.nakshatra.pada, 2);
        assert_eq!(table.nakshatra.degree, 5.0);
        assert!((table.balance_years - 4.375).abs() < 0.01);

        let start = vimshottari(0.0, BIRTH).unwrap();
        assert_eq!(start.nakshatra.name, "Ashwini");
        assert_eq!(start.balance_years, 7.0);

        let last = vimshottari(359.9, BIRTH).unwrap();
        assert_eq!(last.nakshatra.name, "Revati");
        assert_eq!(last.nakshatra.lord, Ruler::Mercury);
        assert_eq!(last.nakshatra.pada, 4);
    }

    #[test]
    fn test_maha_timeline_spans_two_cycles() {
        let table = vimshottari(125.0, BIRTH).unwrap();
        assert_eq!(table.maha_dasas.len(), 18);
        assert!(table.maha_dasas[0].partial);
        assert_eq!(table.maha_dasas[0].span.start, from_julian_day(BIRTH).unwrap());
        assert_eq!(table.maha_dasas[1].span.ruler, Ruler::Venus);
        for pair in table.maha_dasas.windows(2) {
            assert_eq!(pair[0].span.end, pair[1].span.start);
        }
    }

    #[test]
    fn test_dasa_state_brackets_now() {
        let table = vimshottari(200.0, BIRTH).unwrap();
        for years in [0.0, 0.3, 4.9, 17.2, 33.3, 60.0, 119.9, 130.0] {
            let now = BIRTH + years * DAYS_PER_YEAR;
            let state = table.state_at(now).unwrap();
            let p = &state.period;
            assert_current(p.main_period_start, p.main_period_end, now);
            assert_current(p.sub_period_start, p.sub_period_end, now);
            assert_current(state.pratyantar_start, state.pratyantar_end, now);
            assert!(p.remaining_days_in_main_period >= p.remaining_days_in_sub_period);
            assert!(state.future_timeline.len() <= 15);
            assert_eq!(state.all_bhuktis_in_current_dasa.len(), 9);
            assert_eq!(state.all_bhuktis_in_current_dasa[0].ruler, p.main_ruler);
            for pair in state.all_bhuktis_in_current_dasa.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn test_current_period_label() {
        // Ashwini at 0 degrees: Ketu maha dasa starts at birth.
        let table = vimshottari(0.0, BIRTH).unwrap();
        let state = table.state_at(BIRTH + 1.0).unwrap();
        assert_eq!(state.current_period, "Ketu-Ketu-Ketu");
        assert_eq!(state.future_timeline[0].period, "Ketu-Venus");
    }

    #[test]
    fn test_firdaria_sequences() {
        let day = firdaria(10, 3, BIRTH).unwrap();
        assert!(day.day_birth);
        assert_eq!(day.periods[0].ruler, Ruler::Sun);
        assert_eq!(day.periods.len(), 7);

        let night = firdaria(2, 13, BIRTH).unwrap();
        assert!(!night.day_birth);
        assert_eq!(night.periods[0].ruler, Ruler::Moon);

        let state = day.state_at(BIRTH + 10.5 * DAYS_PER_YEAR).unwrap();
        assert_eq!(state.main_ruler, Ruler::Venus);
        assert_eq!(state.sub_ruler, Ruler::Venus);

        // Second cycle restarts with the Sun.
        let later = day.state_at(BIRTH + 72.2 * DAYS_PER_YEAR).unwrap();
        assert_eq!(later.main_ruler, Ruler::Sun);
    }

    #[test]
    fn test_firdaria_state_brackets_now() {
        let table = firdaria(0, 22, BIRTH).unwrap();
        assert!(!table.day_birth);
        for years in [0.01, 8.99, 9.0, 25.5, 71.99, 100.0] {
            let now = BIRTH + years * DAYS_PER_YEAR;
            let state = table.state_at(now).unwrap();
            assert_current(state.main_period_start, state.main_period_end, now);
            assert_current(state.sub_period_start, state.sub_period_end, now);
        }
    }

    #[test]
    fn test_day_birth_rule() {
        assert!(is_day_birth(7, 2));
        assert!(!is_day_birth(6, 12));
        assert!(is_day_birth(0, 12));
        assert!(!is_day_birth(0, 20));
    }

    #[test]
    fn test_before_birth_and_failed_tables() {
        let table = vimshottari(10.0, BIRTH).unwrap();
        assert!(table.state_at(BIRTH - 1.0).is_err());

        let current = current_periods(
            &Section::Ready(table),
            &Section::failed("Sun position missing"),
            BIRTH + 100.0,
        );
        assert!(current.vimshottari.ready().is_some());
        assert_eq!(current.firdaria.error(), Some("Sun position missing"));
    }
}
