//! Sun-Moon phase angle.

use orbis_core::{Body, ChartError, Result, ZodiacPlacement, ZodiacSign, normalize_degrees, round_to};
use serde::{Deserialize, Serialize};

use crate::positions::PositionSet;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53059;

/// Named lunar phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoonPhase {
    /// 0° to 45°.
    #[serde(rename = "New Moon")]
    New,
    /// 45° to 90°.
    #[serde(rename = "Crescent Moon")]
    Crescent,
    /// 90° to 135°.
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    /// 135° to 180°.
    #[serde(rename = "Gibbous Moon")]
    Gibbous,
    /// 180° to 225°.
    #[serde(rename = "Full Moon")]
    Full,
    /// 225° to 270°.
    #[serde(rename = "Disseminating Moon")]
    Disseminating,
    /// 270° to 315°.
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    /// 315° to 360°.
    #[serde(rename = "Balsamic Moon")]
    Balsamic,
}

impl MoonPhase {
    /// Eight-phase name for an angle, in 45° steps.
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        const PHASES: [MoonPhase; 8] = [
            MoonPhase::New,
            MoonPhase::Crescent,
            MoonPhase::FirstQuarter,
            MoonPhase::Gibbous,
            MoonPhase::Full,
            MoonPhase::Disseminating,
            MoonPhase::LastQuarter,
            MoonPhase::Balsamic,
        ];
        let index = (normalize_degrees(angle) / 45.0).floor() as usize;
        PHASES[index.min(7)]
    }

    /// Four-phase name for an angle, centred on the quarters.
    #[must_use]
    pub fn quarter_from_angle(angle: f64) -> Self {
        match normalize_degrees(angle) {
            a if a < 45.0 => Self::New,
            a if a < 135.0 => Self::FirstQuarter,
            a if a < 225.0 => Self::Full,
            a if a < 315.0 => Self::LastQuarter,
            _ => Self::New,
        }
    }
}

/// Natal lunation cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LunationPhase {
    /// Moon minus Sun, `[0, 360)`.
    pub phase_angle: f64,
    /// Sign the phase angle falls in when read as a longitude.
    pub phase_sign: ZodiacSign,
    /// Offset within that sign.
    pub phase_degree_in_sign: f64,
    /// Four-phase name.
    pub phase_name: MoonPhase,
}

/// Progressed lunar phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressedMoonPhase {
    /// Eight-phase name.
    pub phase_name: MoonPhase,
    /// Moon minus Sun, `[0, 360)`.
    pub phase_angle: f64,
    /// Equivalent day of the synodic month.
    pub phase_day_approx: f64,
}

/// Moon minus Sun from a position set.
///
/// # Errors
/// Returns [`ChartError::InvalidInput`] when either luminary is missing or a placeholder.
pub fn phase_angle(positions: &PositionSet) -> Result<f64> {
    let longitude = |body: Body| {
        positions
            .get(&body)
            .filter(|p| p.is_valid())
            .map(|p| p.degree)
            .ok_or_else(|| ChartError::InvalidInput(format!("{body} position missing")))
    };
    Ok(normalize_degrees(longitude(Body::Moon)? - longitude(Body::Sun)?))
}

/// Natal lunation cycle.
///
/// # Errors
/// Fails when the Sun or Moon is missing.
pub fn lunation_cycle(positions: &PositionSet) -> Result<LunationPhase> {
    let angle = phase_angle(positions)?;
    let placement = ZodiacPlacement::from_longitude(angle);
    Ok(LunationPhase {
        phase_angle: round_to(angle, 2),
        phase_sign: placement.sign,
        phase_degree_in_sign: round_to(placement.degree_in_sign, 2),
        phase_name: MoonPhase::quarter_from_angle(angle),
    })
}

/// Progressed lunar phase.
///
/// # Errors
/// Fails when the progressed Sun or Moon is missing.
pub fn progressed_moon_phase(positions: &PositionSet) -> Result<ProgressedMoonPhase> {
    let angle = phase_angle(positions)?;
    Ok(ProgressedMoonPhase {
        phase_name: MoonPhase::from_angle(angle),
        phase_angle: round_to(angle, 2),
        phase_day_approx: round_to(angle / 360.0 * SYNODIC_MONTH_DAYS, 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_positions;

    #[test]
    fn test_phase_names() {
        assert_eq!(MoonPhase::from_angle(10.0), MoonPhase::New);
        assert_eq!(MoonPhase::from_angle(100.0), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::from_angle(359.9), MoonPhase::Balsamic);
        assert_eq!(MoonPhase::quarter_from_angle(60.0), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::quarter_from_angle(330.0), MoonPhase::New);
    }

    #[test]
    fn test_phase_wraps_through_aries() {
        let positions = test_positions(&[(Body::Sun, 350.0), (Body::Moon, 170.0)]);
        let lunation = lunation_cycle(&positions).unwrap();
        assert_eq!(lunation.phase_angle, 180.0);
        assert_eq!(lunation.phase_name, MoonPhase::Full);
        assert_eq!(lunation.phase_sign, ZodiacSign::Libra);

        let progressed = progressed_moon_phase(&positions).unwrap();
        assert_eq!(progressed.phase_name, MoonPhase::Full);
        assert_eq!(progressed.phase_day_approx, 14.8);
    }

    #[test]
    fn test_missing_luminary() {
        let positions = test_positions(&[(Body::Sun, 0.0)]);
        assert!(lunation_cycle(&positions).is_err());
    }
}
