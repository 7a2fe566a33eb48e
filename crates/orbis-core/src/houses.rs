//! House lookup for a longitude against a cusp set.

use crate::zodiac::normalize_degrees;

/// Returns the 1-based house containing `longitude`.
///
/// House `i` spans from `cusps[i]` to `cusps[(i + 1) % 12]`. A pair that
/// straddles 0° (`start >= end`) matches on either side of the wrap.
/// Degenerate cusp data, such as the all-zero fallback set, yields house 1.
#[must_use]
pub fn locate_house(longitude: f64, cusps: &[f64; 12]) -> u8 {
    let lon = normalize_degrees(longitude);
    for (i, &cusp) in cusps.iter().enumerate() {
        let start = normalize_degrees(cusp);
        let end = normalize_degrees(cusps[(i + 1) % 12]);
        let inside = if start < end {
            lon >= start && lon < end
        } else {
            lon >= start || lon < end
        };
        if inside {
            return (i + 1) as u8;
        }
    }
    1
}
