//! Keplerian mean elements and their reduction to geocentric ecliptic coordinates.

use orbis_core::{Body, normalize_degrees};
use serde::{Deserialize, Serialize};

use crate::frames::{cos_deg, precession_since_j2000, sin_deg};

/// Heliocentric osculating elements referred to the J2000 ecliptic and
/// equinox, each with a linear rate per Julian century.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (AU) and rate.
    pub semi_major_axis: (f64, f64),
    /// Eccentricity and rate.
    pub eccentricity: (f64, f64),
    /// Inclination (degrees) and rate.
    pub inclination: (f64, f64),
    /// Mean longitude (degrees) and rate.
    pub mean_longitude: (f64, f64),
    /// Longitude of perihelion (degrees) and rate.
    pub perihelion_longitude: (f64, f64),
    /// Longitude of the ascending node (degrees) and rate.
    pub node_longitude: (f64, f64),
}

impl OrbitalElements {
    /// Heliocentric rectangular J2000 ecliptic coordinates (AU) at `t` centuries TT.
    #[must_use]
    pub fn heliocentric(&self, t: f64) -> [f64; 3] {
        let at = |(value, rate): (f64, f64)| value + rate * t;
        let a = at(self.semi_major_axis);
        let e = at(self.eccentricity);
        let inc = at(self.inclination);
        let l = at(self.mean_longitude);
        let varpi = at(self.perihelion_longitude);
        let node = at(self.node_longitude);

        let omega = varpi - node;
        let mut m = normalize_degrees(l - varpi);
        if m > 180.0 {
            m -= 360.0;
        }
        let ecc_anomaly = solve_kepler(m.to_radians(), e);

        let x_orb = a * (ecc_anomaly.cos() - e);
        let y_orb = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();

        let (so, co) = (sin_deg(omega), cos_deg(omega));
        let (sn, cn) = (sin_deg(node), cos_deg(node));
        let (si, ci) = (sin_deg(inc), cos_deg(inc));

        [
            (co * cn - so * sn * ci) * x_orb + (-so * cn - co * sn * ci) * y_orb,
            (co * sn + so * cn * ci) * x_orb + (-so * sn + co * cn * ci) * y_orb,
            (so * si) * x_orb + (co * si) * y_orb,
        ]
    }
}

/// Solves Kepler's equation `M = E − e sin E` by Newton iteration.
fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc = if e < 0.8 { mean_anomaly } else { std::f64::consts::PI };
    for _ in 0..50 {
        let delta = (ecc - e * ecc.sin() - mean_anomaly) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc
}

const fn elements(
    a: (f64, f64),
    e: (f64, f64),
    i: (f64, f64),
    l: (f64, f64),
    varpi: (f64, f64),
    node: (f64, f64),
) -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: a,
        eccentricity: e,
        inclination: i,
        mean_longitude: l,
        perihelion_longitude: varpi,
        node_longitude: node,
    }
}

/// Earth-Moon barycenter.
pub(crate) const EARTH: OrbitalElements = elements(
    (1.000_002_61, 0.000_005_62),
    (0.016_711_23, -0.000_043_92),
    (-0.000_015_31, -0.012_946_68),
    (100.464_571_66, 35_999.372_449_81),
    (102.937_681_93, 0.323_273_64),
    (0.0, 0.0),
);

/// Built-in mean elements, valid 1800 to 2050.
pub(crate) fn builtin(body: Body) -> Option<OrbitalElements> {
    let el = match body {
        Body::Mercury => elements(
            (0.387_099_27, 0.000_000_37),
            (0.205_635_93, 0.000_019_06),
            (7.004_979_02, -0.005_947_49),
            (252.250_323_50, 149_472.674_111_75),
            (77.457_796_28, 0.160_476_89),
            (48.330_765_93, -0.125_340_81),
        ),
        Body::Venus => elements(
            (0.723_335_66, 0.000_003_90),
            (0.006_776_72, -0.000_041_07),
            (3.394_676_05, -0.000_788_90),
            (181.979_099_50, 58_517.815_387_29),
            (131.602_467_18, 0.002_683_29),
            (76.679_842_55, -0.277_694_18),
        ),
        Body::Mars => elements(
            (1.523_710_34, 0.000_018_47),
            (0.093_394_10, 0.000_078_82),
            (1.849_691_42, -0.008_131_31),
            (-4.553_432_05, 19_140.302_684_99),
            (-23.943_629_59, 0.444_410_88),
            (49.559_538_91, -0.292_573_43),
        ),
        Body::Jupiter => elements(
            (5.202_887_00, -0.000_116_07),
            (0.048_386_24, -0.000_132_53),
            (1.304_396_95, -0.001_837_14),
            (34.396_440_51, 3_034.746_127_75),
            (14.728_479_83, 0.212_526_68),
            (100.473_909_09, 0.204_691_06),
        ),
        Body::Saturn => elements(
            (9.536_675_94, -0.001_250_60),
            (0.053_861_79, -0.000_509_91),
            (2.485_991_87, 0.001_936_09),
            (49.954_244_23, 1_222.493_622_01),
            (92.598_878_31, -0.418_972_16),
            (113.662_424_48, -0.288_677_94),
        ),
        Body::Uranus => elements(
            (19.189_164_64, -0.001_961_76),
            (0.047_257_44, -0.000_043_97),
            (0.772_637_83, -0.002_429_39),
            (313.238_104_51, 428.482_027_85),
            (170.954_276_30, 0.408_052_81),
            (74.016_925_03, 0.042_405_89),
        ),
        Body::Neptune => elements(
            (30.069_922_76, 0.000_262_91),
            (0.008_590_48, 0.000_051_05),
            (1.770_043_47, 0.000_353_72),
            (-55.120_029_69, 218.459_453_25),
            (44.964_762_27, -0.322_414_64),
            (131.784_225_74, -0.005_086_64),
        ),
        Body::Pluto => elements(
            (39.482_116_75, -0.000_315_96),
            (0.248_827_30, 0.000_051_70),
            (17.140_012_06, 0.000_048_18),
            (238.929_038_33, 145.207_805_15),
            (224.068_916_29, -0.040_629_42),
            (110.303_936_84, -0.011_834_82),
        ),
        _ => return None,
    };
    Some(el)
}

/// Geocentric ecliptic longitude and latitude of date (degrees, without
/// nutation) and distance (AU) for an orbit at `t` centuries TT.
pub(crate) fn geocentric_position(orbit: &OrbitalElements, t: f64) -> (f64, f64, f64) {
    let target = orbit.heliocentric(t);
    let earth = EARTH.heliocentric(t);
    let x = target[0] - earth[0];
    let y = target[1] - earth[1];
    let z = target[2] - earth[2];
    let rho = (x * x + y * y).sqrt();
    let lon = y.atan2(x).to_degrees() + precession_since_j2000(t);
    let lat = z.atan2(rho).to_degrees();
    (normalize_degrees(lon), lat, (rho * rho + z * z).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kepler_solution_satisfies_equation() {
        for (m, e) in [(0.3, 0.1), (2.9, 0.25), (-1.2, 0.9)] {
            let ecc = solve_kepler(m, e);
            assert!((ecc - e * ecc.sin() - m).abs() < 1e-10);
        }
    }

    #[test]
    fn test_earth_distance_stays_near_one_au() {
        for t in [-1.5, -0.3, 0.0, 0.24, 0.5] {
            let p = EARTH.heliocentric(t);
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((0.98..1.02).contains(&r), "r = {r}");
        }
    }

    #[test]
    fn test_only_major_planets_are_builtin() {
        assert!(builtin(Body::Saturn).is_some());
        assert!(builtin(Body::Sun).is_none());
        assert!(builtin(Body::Chiron).is_none());
    }
}
