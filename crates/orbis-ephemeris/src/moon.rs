//! Truncated lunar theory plus the mean and true nodes and the mean apogee.
//!
//! The periodic series keeps the terms above roughly 0.002° in longitude,
//! which holds the Moon to a few arcminutes.

use orbis_core::normalize_degrees;

use crate::frames::{cos_deg, sin_deg};

/// Kilometers per astronomical unit.
const KM_PER_AU: f64 = 149_597_870.7;

/// Multipliers of D, M, M′, F and the longitude (1e-6 °) and distance (1e-3 km) coefficients.
const LONGITUDE_DISTANCE_TERMS: [(i8, i8, i8, i8, f64, f64); 30] = [
    (0, 0, 1, 0, 6_288_774.0, -20_905_355.0),
    (2, 0, -1, 0, 1_274_027.0, -3_699_111.0),
    (2, 0, 0, 0, 658_314.0, -2_955_968.0),
    (0, 0, 2, 0, 213_618.0, -569_925.0),
    (0, 1, 0, 0, -185_116.0, 48_888.0),
    (0, 0, 0, 2, -114_332.0, -3_149.0),
    (2, 0, -2, 0, 58_793.0, 246_158.0),
    (2, -1, -1, 0, 57_066.0, -152_138.0),
    (2, 0, 1, 0, 53_322.0, -170_733.0),
    (2, -1, 0, 0, 45_758.0, -204_586.0),
    (0, 1, -1, 0, -40_923.0, -129_620.0),
    (1, 0, 0, 0, -34_720.0, 108_743.0),
    (0, 1, 1, 0, -30_383.0, 104_755.0),
    (2, 0, 0, -2, 15_327.0, 10_321.0),
    (0, 0, 1, 2, -12_528.0, 0.0),
    (0, 0, 1, -2, 10_980.0, 79_661.0),
    (4, 0, -1, 0, 10_675.0, -34_782.0),
    (0, 0, 3, 0, 10_034.0, -23_210.0),
    (4, 0, -2, 0, 8_548.0, -21_636.0),
    (2, 1, -1, 0, -7_888.0, 24_208.0),
    (2, 1, 0, 0, -6_766.0, 30_824.0),
    (1, 0, -1, 0, -5_163.0, -8_379.0),
    (1, 1, 0, 0, 4_987.0, -16_675.0),
    (2, -1, 1, 0, 4_036.0, -12_831.0),
    (2, 0, 2, 0, 3_994.0, -10_445.0),
    (4, 0, 0, 0, 3_861.0, -11_650.0),
    (2, 0, -3, 0, 3_665.0, 14_403.0),
    (0, 1, -2, 0, -2_689.0, -7_003.0),
    (2, 0, -1, 2, -2_602.0, 0.0),
    (2, -1, -2, 0, 2_390.0, 10_056.0),
];

/// Multipliers of D, M, M′, F and the latitude coefficient (1e-6 °).
const LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 14] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
    (0, 0, 2, 1, 17_198.0),
    (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0),
    (2, -1, 0, -1, 8_216.0),
    (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0),
    (2, 1, 0, -1, -3_359.0),
];

/// Fundamental lunar arguments at `t` Julian centuries TT, degrees.
#[derive(Debug, Clone, Copy)]
struct Arguments {
    mean_longitude: f64,
    elongation: f64,
    sun_anomaly: f64,
    moon_anomaly: f64,
    latitude_argument: f64,
    eccentricity_factor: f64,
}

impl Arguments {
    fn at(t: f64) -> Self {
        let t2 = t * t;
        let t3 = t2 * t;
        Self {
            mean_longitude: 218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2
                + t3 / 538_841.0,
            elongation: 297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0,
            sun_anomaly: 357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2,
            moon_anomaly: 134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2
                + t3 / 69_699.0,
            latitude_argument: 93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2
                - t3 / 3_526_000.0,
            eccentricity_factor: 1.0 - 0.002_516 * t - 0.000_007_4 * t2,
        }
    }

    fn argument(&self, d: i8, m: i8, mp: i8, f: i8) -> f64 {
        f64::from(d) * self.elongation
            + f64::from(m) * self.sun_anomaly
            + f64::from(mp) * self.moon_anomaly
            + f64::from(f) * self.latitude_argument
    }

    fn eccentricity_weight(&self, m: i8) -> f64 {
        self.eccentricity_factor.powi(i32::from(m.unsigned_abs()))
    }
}

/// Geometric ecliptic longitude and latitude of date (degrees, without
/// nutation) and distance (AU) of the Moon at `t` Julian centuries TT.
pub(crate) fn geometric_position(t: f64) -> (f64, f64, f64) {
    let a = Arguments::at(t);
    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479_264.290 * t;
    let a3 = 313.45 + 481_266.484 * t;

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(d, m, mp, f, l, r) in &LONGITUDE_DISTANCE_TERMS {
        let arg = a.argument(d, m, mp, f);
        let w = a.eccentricity_weight(m);
        sum_l += l * w * sin_deg(arg);
        sum_r += r * w * cos_deg(arg);
    }
    let mut sum_b = 0.0;
    for &(d, m, mp, f, b) in &LATITUDE_TERMS {
        sum_b += b * a.eccentricity_weight(m) * sin_deg(a.argument(d, m, mp, f));
    }

    sum_l += 3_958.0 * sin_deg(a1)
        + 1_962.0 * sin_deg(a.mean_longitude - a.latitude_argument)
        + 318.0 * sin_deg(a2);
    sum_b += -2_235.0 * sin_deg(a.mean_longitude)
        + 382.0 * sin_deg(a3)
        + 175.0 * sin_deg(a1 - a.latitude_argument)
        + 175.0 * sin_deg(a1 + a.latitude_argument)
        + 127.0 * sin_deg(a.mean_longitude - a.moon_anomaly)
        - 115.0 * sin_deg(a.mean_longitude + a.moon_anomaly);

    let lon = normalize_degrees(a.mean_longitude + sum_l / 1_000_000.0);
    let lat = sum_b / 1_000_000.0;
    let dist_km = 385_000.56 + sum_r / 1_000.0;
    (lon, lat, dist_km / KM_PER_AU)
}

/// Mean longitude of the ascending node, degrees.
pub(crate) fn mean_node(t: f64) -> f64 {
    normalize_degrees(
        125.044_547_9 - 1_934.136_289_1 * t + 0.002_075_4 * t * t + t * t * t / 467_441.0,
    )
}

/// True ascending node: the mean node plus its main periodic terms.
pub(crate) fn true_node(t: f64) -> f64 {
    let a = Arguments::at(t);
    let d = a.elongation;
    let f = a.latitude_argument;
    let correction = -1.4979 * sin_deg(2.0 * (d - f)) - 0.1500 * sin_deg(a.sun_anomaly)
        - 0.1226 * sin_deg(2.0 * d)
        + 0.1176 * sin_deg(2.0 * f)
        - 0.0801 * sin_deg(2.0 * (a.moon_anomaly - f));
    normalize_degrees(mean_node(t) + correction)
}

/// Mean lunar apogee (Black Moon Lilith), degrees.
pub(crate) fn mean_apogee(t: f64) -> f64 {
    let perigee = 83.353_246_5 + 4_069.013_728_7 * t - 0.010_32 * t * t - t * t * t / 80_053.0;
    normalize_degrees(perigee + 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moon_1992_april_12() {
        // JDE 2448724.5, geometric λ 133.162655, β −3.229126, Δ 368409.7 km
        let t = (2_448_724.5 - 2_451_545.0) / 36_525.0;
        let (lon, lat, dist) = geometric_position(t);
        assert!((lon - 133.162_655).abs() < 0.05, "lon = {lon}");
        assert!((lat + 3.229_126).abs() < 0.05, "lat = {lat}");
        assert!((dist * KM_PER_AU - 368_409.7).abs() < 300.0);
    }

    #[test]
    fn test_nodes_move_backwards() {
        let a = mean_node(0.0);
        let b = mean_node(1.0 / 36_525.0);
        assert!(orbis_core::signed_delta(a, b) < 0.0);
        assert!((true_node(0.0) - a).abs() < 2.0);
    }
}
