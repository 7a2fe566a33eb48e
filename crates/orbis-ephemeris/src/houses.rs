//! House division from sidereal time, latitude and obliquity.

use orbis_core::{
    ChartAngles, ChartError, HouseCuspSet, HouseSystem, Result, normalize_degrees,
};

use crate::frames::{atan2_deg, cos_deg, sin_deg};

/// Placidus semi-arcs are undefined inside the polar circles.
pub(crate) const PLACIDUS_LATITUDE_LIMIT: f64 = 66.5;

const POLE_CLAMP: f64 = 89.9999;

/// Ecliptic longitude rising on a horizon of pole height `pole` when the
/// local sidereal time is `theta`.
fn ascendant(theta: f64, pole: f64, eps: f64) -> f64 {
    let pole = pole.clamp(-POLE_CLAMP, POLE_CLAMP);
    atan2_deg(
        cos_deg(theta),
        -(sin_deg(theta) * cos_deg(eps) + pole.to_radians().tan() * sin_deg(eps)),
    )
}

/// Ecliptic longitude with right ascension `ra`.
fn longitude_from_ra(ra: f64, eps: f64) -> f64 {
    atan2_deg(sin_deg(ra), cos_deg(ra) * cos_deg(eps))
}

/// Computes the angles for a sidereal time and latitude.
pub(crate) fn angles(ramc: f64, latitude: f64, eps: f64) -> ChartAngles {
    let colatitude = if latitude >= 0.0 {
        90.0 - latitude
    } else {
        -90.0 - latitude
    };
    ChartAngles {
        ascendant: ascendant(ramc, latitude, eps),
        mc: longitude_from_ra(ramc, eps),
        armc: normalize_degrees(ramc),
        vertex: ascendant(ramc + 180.0, colatitude, eps),
    }
}

/// Computes twelve cusps and the angles.
pub(crate) fn compute(
    ramc: f64,
    latitude: f64,
    eps: f64,
    system: HouseSystem,
) -> Result<HouseCuspSet> {
    let angles = angles(ramc, latitude, eps);
    let asc = angles.ascendant;
    let mc = angles.mc;

    let mut cusps = [0.0; 12];
    match system {
        HouseSystem::Equal => {
            for (i, c) in cusps.iter_mut().enumerate() {
                *c = asc + 30.0 * i as f64;
            }
        }
        HouseSystem::WholeSign => {
            let first = (asc / 30.0).floor() * 30.0;
            for (i, c) in cusps.iter_mut().enumerate() {
                *c = first + 30.0 * i as f64;
            }
        }
        HouseSystem::Porphyry => {
            let upper = normalize_degrees(asc - mc);
            let lower = 180.0 - upper;
            cusps[10] = mc + upper / 3.0;
            cusps[11] = mc + 2.0 * upper / 3.0;
            cusps[1] = asc + lower / 3.0;
            cusps[2] = asc + 2.0 * lower / 3.0;
            fill_quadrants(&mut cusps, asc, mc);
        }
        HouseSystem::Placidus => {
            if latitude.abs() > PLACIDUS_LATITUDE_LIMIT {
                return Err(ChartError::Provider(format!(
                    "Placidus houses undefined at latitude {latitude:.2}"
                )));
            }
            cusps[10] = placidus_cusp(ramc, latitude, eps, 1.0 / 3.0, true)?;
            cusps[11] = placidus_cusp(ramc, latitude, eps, 2.0 / 3.0, true)?;
            cusps[1] = placidus_cusp(ramc, latitude, eps, 2.0 / 3.0, false)?;
            cusps[2] = placidus_cusp(ramc, latitude, eps, 1.0 / 3.0, false)?;
            fill_quadrants(&mut cusps, asc, mc);
        }
        HouseSystem::Regiomontanus => {
            for (idx, h) in [(10, 30.0), (11, 60.0), (1, 120.0), (2, 150.0)] {
                let pole = (latitude.to_radians().tan() * sin_deg(h)).atan().to_degrees();
                cusps[idx] = ascendant(ramc + h - 90.0, pole, eps);
            }
            fill_quadrants(&mut cusps, asc, mc);
        }
        HouseSystem::Campanus => {
            for (idx, a) in [(10, 30.0), (11, 60.0), (1, 120.0), (2, 150.0)] {
                let h = atan2_deg(sin_deg(a) * cos_deg(latitude), cos_deg(a));
                let pole = (sin_deg(latitude) * sin_deg(a)).asin().to_degrees();
                cusps[idx] = ascendant(ramc + h - 90.0, pole, eps);
            }
            fill_quadrants(&mut cusps, asc, mc);
        }
    }

    for c in &mut cusps {
        *c = normalize_degrees(*c);
    }
    Ok(HouseCuspSet {
        house_system: system,
        cusps,
        angles,
        error: None,
    })
}

/// Sets the angular cusps and mirrors 11, 12, 2, 3 onto 5, 6, 8, 9.
fn fill_quadrants(cusps: &mut [f64; 12], asc: f64, mc: f64) {
    cusps[0] = asc;
    cusps[9] = mc;
    cusps[3] = mc + 180.0;
    cusps[6] = asc + 180.0;
    for (from, to) in [(10, 4), (11, 5), (1, 7), (2, 8)] {
        cusps[to] = cusps[from] + 180.0;
    }
}

/// Iterates a Placidus cusp: the ecliptic point whose hour angle is the
/// given fraction of its own diurnal (above) or nocturnal (below) semi-arc.
fn placidus_cusp(ramc: f64, latitude: f64, eps: f64, fraction: f64, above: bool) -> Result<f64> {
    let tan_lat = latitude.to_radians().tan();
    let offset = |sda: f64| {
        if above {
            fraction * sda
        } else {
            180.0 - fraction * (180.0 - sda)
        }
    };

    let mut ra = ramc + offset(90.0);
    let mut lon = longitude_from_ra(ra, eps);
    for _ in 0..100 {
        let dec = (sin_deg(eps) * sin_deg(lon)).asin();
        let x = tan_lat * dec.tan();
        if x.abs() >= 1.0 {
            return Err(ChartError::Provider(format!(
                "Placidus semi-arc undefined at latitude {latitude:.2}"
            )));
        }
        let sda = 90.0 + x.asin().to_degrees();
        ra = ramc + offset(sda);
        let next = longitude_from_ra(ra, eps);
        let delta = orbis_core::signed_delta(lon, next);
        lon = next;
        if delta.abs() < 1e-9 {
            return Ok(lon);
        }
    }
    Ok(lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{locate_house, separation};

    const EPS: f64 = 23.4393;

    #[test]
    fn test_ascendant_at_equator_and_zero_sidereal_time() {
        let a = angles(0.0, 0.0, EPS);
        assert!((a.ascendant - 90.0).abs() < 1e-9, "asc = {}", a.ascendant);
        assert!(a.mc.abs() < 1e-9 || (a.mc - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_ascendant_follows_midheaven() {
        let a = angles(90.0, 0.0, EPS);
        assert!((a.mc - 90.0).abs() < 1e-9);
        assert!((a.ascendant - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_placidus_fails_in_polar_circle() {
        assert!(compute(100.0, 70.0, EPS, HouseSystem::Placidus).is_err());
        assert!(compute(100.0, -67.0, EPS, HouseSystem::Placidus).is_err());
        assert!(compute(100.0, 70.0, EPS, HouseSystem::Porphyry).is_ok());
    }

    #[test]
    fn test_every_system_keeps_angles_on_cusps() {
        for system in [
            HouseSystem::Placidus,
            HouseSystem::Porphyry,
            HouseSystem::Regiomontanus,
            HouseSystem::Campanus,
        ] {
            let set = compute(213.7, 41.0, EPS, system).unwrap();
            assert!(separation(set.cusps[0], set.angles.ascendant) < 1e-9, "{system}");
            assert!(separation(set.cusps[9], set.angles.mc) < 1e-9, "{system}");
            assert!(separation(set.cusps[6], set.cusps[0]) > 179.999, "{system}");
        }
    }

    #[test]
    fn test_intermediate_cusps_are_ordered() {
        for system in [
            HouseSystem::Placidus,
            HouseSystem::Porphyry,
            HouseSystem::Regiomontanus,
            HouseSystem::Campanus,
        ] {
            let set = compute(35.0, 51.5, EPS, system).unwrap();
            let c = set.cusps;
            // MC, 11, 12, ASC proceed forward through the zodiac
            let d11 = normalize_degrees(c[10] - c[9]);
            let d12 = normalize_degrees(c[11] - c[9]);
            let dasc = normalize_degrees(c[0] - c[9]);
            assert!(0.0 < d11 && d11 < d12 && d12 < dasc, "{system}: {c:?}");
        }
    }

    #[test]
    fn test_whole_sign_and_equal() {
        let set = compute(10.0, 0.0, EPS, HouseSystem::WholeSign).unwrap();
        assert_eq!(set.cusps[0], 90.0);
        assert_eq!(set.cusps[11], 60.0);
        let set = compute(10.0, 30.0, EPS, HouseSystem::Equal).unwrap();
        assert!((normalize_degrees(set.cusps[1] - set.cusps[0]) - 30.0).abs() < 1e-9);
        assert_eq!(locate_house(set.angles.ascendant + 1.0, &set.cusps), 1);
    }
}
