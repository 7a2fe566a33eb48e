//! Time scales, Earth orientation and angle helpers shared by the theories.

use orbis_core::normalize_degrees;
use orbis_core::time::J2000_JD;

const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian centuries since J2000.0.
pub(crate) fn centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

pub(crate) fn sin_deg(deg: f64) -> f64 {
    deg.to_radians().sin()
}

pub(crate) fn cos_deg(deg: f64) -> f64 {
    deg.to_radians().cos()
}

pub(crate) fn atan2_deg(y: f64, x: f64) -> f64 {
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Decimal year of a Julian day, close enough for ΔT lookup.
pub(crate) fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000_JD) / 365.25
}

/// ΔT = TT − UT in seconds, piecewise polynomial fit.
pub(crate) fn delta_t_seconds(jd_ut: f64) -> f64 {
    let y = decimal_year(jd_ut);
    let long_term = |y: f64| {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    };
    match y {
        y if y < 1900.0 => long_term(y),
        y if y < 1920.0 => {
            let t = y - 1900.0;
            -2.79 + 1.494_119 * t - 0.059_893_9 * t.powi(2) + 0.006_196_6 * t.powi(3)
                - 0.000_197 * t.powi(4)
        }
        y if y < 1941.0 => {
            let t = y - 1920.0;
            21.20 + 0.844_93 * t - 0.076_100 * t.powi(2) + 0.002_093_6 * t.powi(3)
        }
        y if y < 1961.0 => {
            let t = y - 1950.0;
            29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
        }
        y if y < 1986.0 => {
            let t = y - 1975.0;
            45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
        }
        y if y < 2005.0 => {
            let t = y - 2000.0;
            63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
                + 0.001_727_5 * t.powi(3)
                + 0.000_651_814 * t.powi(4)
                + 0.000_023_735_99 * t.powi(5)
        }
        y if y < 2050.0 => {
            let t = y - 2000.0;
            62.92 + 0.322_17 * t + 0.005_589 * t.powi(2)
        }
        y if y < 2150.0 => long_term(y) - 0.5628 * (2150.0 - y),
        y => long_term(y),
    }
}

/// Terrestrial time for a UT Julian day.
pub(crate) fn to_tt(jd_ut: f64) -> f64 {
    jd_ut + delta_t_seconds(jd_ut) / 86_400.0
}

/// Nutation in longitude and obliquity, degrees.
pub(crate) fn nutation(t: f64) -> (f64, f64) {
    let omega = 125.044_52 - 1_934.136_261 * t;
    let l_sun = 280.4665 + 36_000.7698 * t;
    let l_moon = 218.3165 + 481_267.8813 * t;
    let dpsi = -17.20 * sin_deg(omega) - 1.32 * sin_deg(2.0 * l_sun) - 0.23 * sin_deg(2.0 * l_moon)
        + 0.21 * sin_deg(2.0 * omega);
    let deps = 9.20 * cos_deg(omega) + 0.57 * cos_deg(2.0 * l_sun) + 0.10 * cos_deg(2.0 * l_moon)
        - 0.09 * cos_deg(2.0 * omega);
    (dpsi / 3600.0, deps / 3600.0)
}

/// Mean obliquity of the ecliptic, degrees.
pub(crate) fn mean_obliquity(t: f64) -> f64 {
    23.439_291_111 - 0.013_004_166_7 * t - 1.638_9e-7 * t * t + 5.036_1e-7 * t * t * t
}

/// True obliquity of the ecliptic for a TT Julian day.
pub(crate) fn true_obliquity(jd_tt: f64) -> f64 {
    let t = centuries(jd_tt);
    mean_obliquity(t) + nutation(t).1
}

/// Apparent Greenwich sidereal time for a UT Julian day, degrees.
pub(crate) fn apparent_sidereal_time(jd_ut: f64) -> f64 {
    let t = centuries(jd_ut);
    let mean = 280.460_618_37 + 360.985_647_366_29 * (jd_ut - J2000_JD) + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    let t_tt = centuries(to_tt(jd_ut));
    let (dpsi, deps) = nutation(t_tt);
    let eps = mean_obliquity(t_tt) + deps;
    normalize_degrees(mean + dpsi * cos_deg(eps))
}

/// General precession in longitude since J2000, degrees.
pub(crate) fn precession_since_j2000(t: f64) -> f64 {
    1.396_971_3 * t + 0.000_308_6 * t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_t_is_plausible() {
        let jd_2000 = J2000_JD;
        let dt = delta_t_seconds(jd_2000);
        assert!((dt - 63.8).abs() < 1.0, "ΔT(2000) = {dt}");
        let jd_1950 = J2000_JD - 50.0 * 365.25;
        assert!((delta_t_seconds(jd_1950) - 29.1).abs() < 1.5);
    }

    #[test]
    fn test_obliquity_at_j2000() {
        let eps = mean_obliquity(0.0);
        assert!((eps - 23.4393).abs() < 1e-3);
    }

    #[test]
    fn test_sidereal_time_at_j2000() {
        let gst = apparent_sidereal_time(J2000_JD);
        assert!((gst - 280.46).abs() < 0.01, "GST = {gst}");
    }
}
