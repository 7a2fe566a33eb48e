//! Civil time and Julian day conversion.
//!
//! Inputs arrive as a local calendar date, a wall-clock time and a UTC
//! offset. The ephemeris works in Julian days (UT). [`CivilInstant`] carries
//! the former and converts to and from the latter.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, Timelike, Utc,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChartError, Result};

/// Julian day of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian day of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian day (UT) of a UTC instant.
#[must_use]
pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// UTC instant of a Julian day, rounded to the millisecond.
#[must_use]
pub fn from_julian_day(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Nautical time zone for a longitude: `round(lon / 15)` hours.
#[must_use]
pub fn offset_from_longitude(longitude: f64) -> FixedOffset {
    let hours = (longitude / 15.0).round().clamp(-12.0, 12.0) as i32;
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Builds a fixed offset from minutes east of UTC.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] for offsets beyond ±18 hours.
pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ChartError::InvalidInput(format!("UTC offset out of range: {minutes} min")))
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] when the text is not a valid date.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| ChartError::InvalidInput(format!("Invalid date '{text}': {e}")))
}

/// Parses `HH:MM:SS`, `HH:MM` or `HH`.
///
/// Anything else falls back to noon and logs a warning.
#[must_use]
pub fn parse_time(text: &str) -> NaiveTime {
    let text = text.trim();
    let parsed = NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
        .or_else(|| {
            text.parse::<u32>()
                .ok()
                .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0))
        });
    parsed.unwrap_or_else(|| {
        warn!(input = text, "Unrecognized time format, using 12:00:00");
        noon()
    })
}

/// 12:00:00.
#[must_use]
pub fn noon() -> NaiveTime {
    NaiveTime::MIN + TimeDelta::hours(12)
}

/// A local wall-clock instant with its UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilInstant {
    /// Local calendar date.
    pub date: NaiveDate,
    /// Local wall-clock time.
    pub time: NaiveTime,
    /// Offset of local time from UTC, serialized as seconds east.
    #[serde(with = "offset_seconds")]
    pub offset: FixedOffset,
}

impl CivilInstant {
    /// Creates a civil instant.
    #[must_use]
    pub const fn new(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Self {
        Self { date, time, offset }
    }

    /// Local date and time combined.
    #[must_use]
    pub const fn naive_local(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.time)
    }

    /// The same instant in UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        let utc = self.naive_local() - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        utc.and_utc()
    }

    /// Julian day (UT).
    #[must_use]
    pub fn julian_day(&self) -> f64 {
        julian_day(self.to_utc())
    }

    /// Converts a Julian day back to local time at `offset`.
    #[must_use]
    pub fn from_julian_day(jd: f64, offset: FixedOffset) -> Option<Self> {
        let local = from_julian_day(jd)?.with_timezone(&offset).naive_local();
        Some(Self::new(local.date(), local.time(), offset))
    }

    /// Converts a UTC instant to local time at `offset`.
    #[must_use]
    pub fn from_utc(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = instant.with_timezone(&offset).naive_local();
        Self::new(local.date(), local.time(), offset)
    }

    /// Shifts the instant by a fractional number of days.
    #[must_use]
    pub fn plus_days(&self, days: f64) -> Self {
        let millis = (days * MILLIS_PER_DAY).round() as i64;
        let local = self.naive_local() + TimeDelta::milliseconds(millis);
        Self::new(local.date(), local.time(), self.offset)
    }

    /// Local hour of day, used for day/night tests.
    #[must_use]
    pub fn local_hour(&self) -> u32 {
        self.time.hour()
    }

    /// Formats as `YYYY-MM-DD HH:MM:SS` local time.
    #[must_use]
    pub fn format_local(&self) -> String {
        self.naive_local().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

mod offset_seconds {
    use chrono::FixedOffset;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S: Serializer>(offset: &FixedOffset, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i32(offset.local_minus_utc())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FixedOffset, D::Error> {
        let secs = i32::deserialize(d)?;
        FixedOffset::east_opt(secs).ok_or_else(|| de::Error::custom("UTC offset out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn test_j2000_julian_day() {
        let dt = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        assert!((julian_day(dt) - J2000_JD).abs() < 1e-9);
    }

    #[test]
    fn test_local_offset_is_applied() {
        let civil = CivilInstant::new(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            offset(3),
        );
        assert!((civil.julian_day() - (J2000_JD - 3.0 / 24.0)).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_within_one_second() {
        let cases = [
            ("1950-06-15", "04:31:17", -5),
            ("2000-01-01", "12:00:00", 3),
            ("2024-02-29", "23:59:59", 14),
            ("1899-12-31", "00:00:01", 0),
        ];
        for (date, time, hours) in cases {
            let civil = CivilInstant::new(parse_date(date).unwrap(), parse_time(time), offset(hours));
            let back = CivilInstant::from_julian_day(civil.julian_day(), civil.offset).unwrap();
            let drift = (back.naive_local() - civil.naive_local()).num_milliseconds().abs();
            assert!(drift <= 1000, "{date} {time}: drift {drift} ms");
        }
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("07:45:30"), NaiveTime::from_hms_opt(7, 45, 30).unwrap());
        assert_eq!(parse_time("07:45"), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert_eq!(parse_time("7"), NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(parse_time("quarter past"), noon());
        assert_eq!(parse_time("25"), noon());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("01/02/2024").is_err());
        assert_eq!(
            parse_date(" 2024-04-10 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
        );
    }

    #[test]
    fn test_offset_from_longitude() {
        assert_eq!(offset_from_longitude(29.0).local_minus_utc(), 2 * 3600);
        assert_eq!(offset_from_longitude(-73.9).local_minus_utc(), -5 * 3600);
        assert_eq!(offset_from_longitude(179.9).local_minus_utc(), 12 * 3600);
        assert!(offset_from_minutes(19 * 60).is_err());
    }

    #[test]
    fn test_extreme_offsets_are_rejected() {
        for minutes in [i32::MAX, i32::MIN, 18 * 60 + 1, -(18 * 60 + 1)] {
            assert!(matches!(
                offset_from_minutes(minutes),
                Err(ChartError::InvalidInput(_))
            ));
        }
        assert_eq!(offset_from_minutes(-300).unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_plus_days_crosses_midnight() {
        let civil = CivilInstant::new(
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            offset(0),
        );
        let later = civil.plus_days(0.5);
        assert_eq!(later.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(later.local_hour(), 6);
    }
}
