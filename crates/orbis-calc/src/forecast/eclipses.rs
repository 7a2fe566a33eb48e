//! Forward scan for eclipses inside a time window.

use chrono::NaiveDate;
use orbis_core::{
    CivilInstant, EclipseClass, EclipseEvent, EclipseKind, EphemerisProvider, Result, round_to,
    time::julian_day,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Earliest and latest years a window may reach.
const SCAN_YEARS: (i32, i32) = (100, 3000);
/// Step past a found event before searching again, in days.
const STEP_PAST_EVENT: f64 = 1.0;

/// Type, magnitude and cycle of an eclipse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EclipseDetails {
    /// Solar or lunar.
    pub kind: EclipseKind,
    /// Total, annular, partial and so on.
    pub class: EclipseClass,
    /// Magnitude, four decimals.
    pub magnitude: f64,
    /// Lunation number of the syzygy.
    pub cycle: i64,
}

/// An eclipse in local time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EclipseRecord {
    /// Local time of greatest eclipse, `YYYY-MM-DD HH:MM:SS`.
    pub datetime: String,
    /// Label such as `Solar Total`.
    pub eclipse_type: String,
    /// Classification.
    pub details: EclipseDetails,
    #[serde(skip)]
    jd: f64,
}

impl EclipseRecord {
    fn new(event: &EclipseEvent, local: &CivilInstant) -> Self {
        Self {
            datetime: local.format_local(),
            eclipse_type: event.label(),
            details: EclipseDetails {
                kind: event.kind,
                class: event.class,
                magnitude: round_to(event.magnitude, 4),
                cycle: event.lunation,
            },
            jd: event.jd,
        }
    }

    fn local_date(&self) -> &str {
        self.datetime.get(..10).unwrap_or(&self.datetime)
    }
}

fn year_start_jd(year: i32) -> f64 {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(f64::NAN, |dt| julian_day(dt.and_utc()))
}

/// Scans `[start_jd, end_jd]` for solar and lunar eclipses, in local time at `local`'s offset.
///
/// The window is clamped to the years 100 to 3000. At most `cap` events are
/// collected. Results are sorted and keep one eclipse per local date.
///
/// # Errors
/// Propagates a provider error only when both searches fail on the first step.
#[instrument(skip(provider, local))]
pub fn scan_eclipses(
    provider: &dyn EphemerisProvider,
    start_jd: f64,
    end_jd: f64,
    local: &CivilInstant,
    cap: usize,
) -> Result<Vec<EclipseRecord>> {
    let start = start_jd.max(year_start_jd(SCAN_YEARS.0));
    let end = end_jd.min(year_start_jd(SCAN_YEARS.1));
    let mut events: Vec<EclipseEvent> = Vec::new();
    let mut t = start;

    while start < end && events.len() < cap {
        let next = match (provider.next_solar_eclipse(t), provider.next_lunar_eclipse(t)) {
            (Ok(solar), Ok(lunar)) => {
                if solar.jd <= lunar.jd {
                    solar
                } else {
                    lunar
                }
            }
            (Ok(event), Err(e)) | (Err(e), Ok(event)) => {
                debug!(error = %e, "One eclipse search failed");
                event
            }
            (Err(e), Err(_)) if events.is_empty() => return Err(e),
            (Err(e), Err(_)) => {
                debug!(error = %e, "Eclipse scan stopped early");
                break;
            }
        };
        if next.jd > end {
            break;
        }
        t = next.jd + STEP_PAST_EVENT;
        events.push(next);
    }

    let mut records: Vec<EclipseRecord> = events
        .iter()
        .filter_map(|e| {
            let at = CivilInstant::from_julian_day(e.jd, local.offset)?;
            Some(EclipseRecord::new(e, &at))
        })
        .collect();
    records.sort_by(|a, b| a.jd.total_cmp(&b.jd));
    records.dedup_by(|b, a| a.local_date() == b.local_date());
    debug!(count = records.len(), "Eclipse scan finished");
    Ok(records)
}

/// Eclipses within `days` either side of `center`.
///
/// # Errors
/// See [`scan_eclipses`].
pub fn eclipses_near(
    provider: &dyn EphemerisProvider,
    center: &CivilInstant,
    days: f64,
    cap: usize,
) -> Result<Vec<EclipseRecord>> {
    let jd = center.julian_day();
    scan_eclipses(provider, jd - days, jd + days, center, cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use orbis_core::time::offset_from_minutes;
    use orbis_ephemeris::AnalyticEphemeris;

    fn local(y: i32, m: u32, d: u32) -> CivilInstant {
        CivilInstant::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            offset_from_minutes(0).unwrap(),
        )
    }

    #[test]
    fn test_empty_window() {
        let provider = AnalyticEphemeris::new();
        let records = eclipses_near(&provider, &local(2024, 6, 15), 10.0, 64).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_year_2024() {
        let provider = AnalyticEphemeris::new();
        let records = eclipses_near(&provider, &local(2024, 7, 1), 180.0, 64).unwrap();
        let dates: Vec<&str> = records.iter().map(EclipseRecord::local_date).collect();
        assert!(dates.contains(&"2024-03-25"), "{dates:?}");
        assert!(dates.contains(&"2024-04-08"), "{dates:?}");
        let total = records.iter().find(|r| r.local_date() == "2024-04-08").unwrap();
        assert_eq!(total.eclipse_type, "Solar Total");
        assert_eq!(total.details.cycle, 300);
        assert!(records.windows(2).all(|w| w[0].jd < w[1].jd));
    }

    #[test]
    fn test_cap_and_clamp() {
        let provider = AnalyticEphemeris::new();
        let center = local(2024, 7, 1);
        assert_eq!(eclipses_near(&provider, &center, 3650.0, 3).unwrap().len(), 3);

        let far = year_start_jd(3100);
        assert!(scan_eclipses(&provider, far, far + 400.0, &center, 64).unwrap().is_empty());
    }
}
