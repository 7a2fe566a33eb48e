//! Low-precision solar theory, good to about 0.01°.

use orbis_core::normalize_degrees;

use crate::frames::{cos_deg, sin_deg};

/// Apparent geocentric ecliptic longitude of the Sun (degrees) and its
/// distance (AU) at `t` Julian centuries TT.
pub(crate) fn apparent_position(t: f64) -> (f64, f64) {
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = 357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t;
    let e = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * sin_deg(m)
        + (0.019_993 - 0.000_101 * t) * sin_deg(2.0 * m)
        + 0.000_289 * sin_deg(3.0 * m);
    let true_lon = l0 + c;
    let nu = m + c;
    let r = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * cos_deg(nu));
    let omega = 125.04 - 1_934.136 * t;
    let apparent = true_lon - 0.005_69 - 0.004_78 * sin_deg(omega);
    (normalize_degrees(apparent), r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_1992_october_13() {
        // JDE 2448908.5
        let t = (2_448_908.5 - 2_451_545.0) / 36_525.0;
        let (lon, r) = apparent_position(t);
        assert!((lon - 199.908_94).abs() < 0.01, "lon = {lon}");
        assert!((r - 0.997_66).abs() < 1e-4, "r = {r}");
    }
}
