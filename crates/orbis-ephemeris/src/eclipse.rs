//! Eclipse search over lunations.
//!
//! Each new (solar) or full (lunar) moon is placed from its mean instant
//! plus periodic corrections, then classified by the Moon's argument of
//! latitude and the shadow-axis distance `γ`.

use orbis_core::{ChartError, EclipseClass, EclipseEvent, EclipseKind, Result};

use crate::frames::{cos_deg, delta_t_seconds, sin_deg};

const SYNODIC_MONTH: f64 = 29.530_588_861;
const LUNATION_ZERO_JDE: f64 = 2_451_550.097_66;

/// Lunations scanned before giving up; eclipses recur at least twice a year.
const MAX_LUNATIONS: u32 = 240;

#[derive(Debug, Clone, Copy)]
struct Syzygy {
    jde: f64,
    gamma: f64,
    u: f64,
}

/// Corrected instant and shadow geometry for lunation `k`, or `None` when
/// the Moon is too far from a node for any eclipse.
fn syzygy(k: f64, kind: EclipseKind) -> Option<Syzygy> {
    let t = k / 1_236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let f = 160.710_8 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3
        + 0.000_000_011 * t4;
    if sin_deg(f).abs() > 0.36 {
        return None;
    }

    let mean_jde = LUNATION_ZERO_JDE + SYNODIC_MONTH * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = 2.553_4 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3;
    let mp = 201.564_3 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3
        - 0.000_000_058 * t4;
    let omega = 124.774_6 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3;
    let f1 = f - 0.026_65 * sin_deg(omega);
    let a1 = 299.77 + 0.107_408 * k - 0.009_173 * t2;

    let leading = match kind {
        EclipseKind::Solar => -0.4075 * sin_deg(mp) + 0.1721 * e * sin_deg(m),
        EclipseKind::Lunar => -0.4065 * sin_deg(mp) + 0.1727 * e * sin_deg(m),
    };
    let correction = leading + 0.0161 * sin_deg(2.0 * mp) - 0.0097 * sin_deg(2.0 * f1)
        + 0.0073 * e * sin_deg(mp - m)
        - 0.0050 * e * sin_deg(mp + m)
        - 0.0023 * sin_deg(mp - 2.0 * f1)
        + 0.0021 * e * sin_deg(2.0 * m)
        + 0.0012 * sin_deg(mp + 2.0 * f1)
        + 0.0006 * e * sin_deg(2.0 * mp + m)
        - 0.0004 * sin_deg(3.0 * mp)
        - 0.0003 * e * sin_deg(m + 2.0 * f1)
        + 0.0003 * sin_deg(a1)
        - 0.0002 * e * sin_deg(m - 2.0 * f1)
        - 0.0002 * e * sin_deg(2.0 * mp - m)
        - 0.0002 * sin_deg(omega);

    let p = 0.2070 * e * sin_deg(m) + 0.0024 * e * sin_deg(2.0 * m) - 0.0392 * sin_deg(mp)
        + 0.0116 * sin_deg(2.0 * mp)
        - 0.0073 * e * sin_deg(mp + m)
        + 0.0067 * e * sin_deg(mp - m)
        + 0.0118 * sin_deg(2.0 * f1);
    let q = 5.2207 - 0.0048 * e * cos_deg(m) + 0.0020 * e * cos_deg(2.0 * m)
        - 0.3299 * cos_deg(mp)
        - 0.0060 * e * cos_deg(mp + m)
        + 0.0041 * e * cos_deg(mp - m);
    let w = cos_deg(f1).abs();
    let gamma = (p * cos_deg(f1) + q * sin_deg(f1)) * (1.0 - 0.0048 * w);
    let u = 0.0059 + 0.0046 * e * cos_deg(m) - 0.0182 * cos_deg(mp) + 0.0004 * cos_deg(2.0 * mp)
        - 0.0005 * cos_deg(m + mp);

    Some(Syzygy {
        jde: mean_jde + correction,
        gamma,
        u,
    })
}

/// Classification and magnitude of a solar eclipse, if any.
fn classify_solar(s: &Syzygy) -> Option<(EclipseClass, f64)> {
    let g = s.gamma.abs();
    if g > 1.5433 + s.u {
        return None;
    }
    if g < 0.9972 {
        let hybrid_limit = 0.004_64 * (1.0 - s.gamma * s.gamma).sqrt();
        let class = if s.u < 0.0 {
            EclipseClass::Total
        } else if s.u > 0.0047 || s.u >= hybrid_limit {
            EclipseClass::Annular
        } else {
            EclipseClass::Hybrid
        };
        return Some((class, 1.0));
    }
    let magnitude = (1.5433 + s.u - g) / (0.5461 + 2.0 * s.u);
    Some((EclipseClass::Partial, magnitude))
}

/// Classification and magnitude of a lunar eclipse, if any.
fn classify_lunar(s: &Syzygy) -> Option<(EclipseClass, f64)> {
    let g = s.gamma.abs();
    let penumbral = (1.5573 + s.u - g) / 0.5450;
    if penumbral <= 0.0 {
        return None;
    }
    let umbral = (1.0128 - s.u - g) / 0.5450;
    Some(if umbral >= 1.0 {
        (EclipseClass::Total, umbral)
    } else if umbral > 0.0 {
        (EclipseClass::Partial, umbral)
    } else {
        (EclipseClass::Penumbral, penumbral)
    })
}

/// First eclipse of `kind` whose greatest phase (UT) falls on or after `jd_ut`.
pub(crate) fn next_eclipse(jd_ut: f64, kind: EclipseKind) -> Result<EclipseEvent> {
    if !jd_ut.is_finite() {
        return Err(ChartError::InvalidInput(format!("Invalid Julian day {jd_ut}")));
    }
    let phase = match kind {
        EclipseKind::Solar => 0.0,
        EclipseKind::Lunar => 0.5,
    };
    let start = ((jd_ut - LUNATION_ZERO_JDE) / SYNODIC_MONTH).floor() - 1.0;

    for step in 0..MAX_LUNATIONS {
        let k = start + f64::from(step) + phase;
        let Some(s) = syzygy(k, kind) else {
            continue;
        };
        let jd = s.jde - delta_t_seconds(s.jde) / 86_400.0;
        if jd < jd_ut {
            continue;
        }
        let classified = match kind {
            EclipseKind::Solar => classify_solar(&s),
            EclipseKind::Lunar => classify_lunar(&s),
        };
        if let Some((class, magnitude)) = classified {
            return Ok(EclipseEvent {
                jd,
                kind,
                class,
                magnitude: orbis_core::round_to(magnitude, 4),
                lunation: k.floor() as i64,
            });
        }
    }
    Err(ChartError::NonConvergence {
        iterations: MAX_LUNATIONS,
    })
}
