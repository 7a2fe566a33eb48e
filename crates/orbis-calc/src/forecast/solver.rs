//! Newton-style search for the instant a body reaches a target longitude.

use orbis_core::{ChartError, Result, signed_delta};
use tracing::trace;

/// Finds the next instant at which a longitude function reaches a target.
///
/// The first step always moves forward in time, so the root found is the
/// first one at or after the search start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootSolver {
    /// Convergence tolerance in degrees.
    pub tolerance_deg: f64,
    /// Iteration cap.
    pub max_iterations: u32,
    /// Speeds below this magnitude, in degrees per day, abort the search.
    pub stall_speed: f64,
}

impl RootSolver {
    /// Parameters for the Sun.
    pub const SOLAR: Self = Self {
        tolerance_deg: 1e-4,
        max_iterations: 50,
        stall_speed: 0.01,
    };

    /// Parameters for the Moon.
    pub const LUNAR: Self = Self {
        tolerance_deg: 1e-4,
        max_iterations: 100,
        stall_speed: 0.1,
    };

    /// Runs the search.
    ///
    /// `sample` returns the longitude and speed (degrees per day) at a Julian day.
    ///
    /// # Errors
    /// Returns [`ChartError::Stalled`] when the speed falls below the stall
    /// threshold, [`ChartError::NonConvergence`] when the iteration cap is hit,
    /// and propagates any error from `sample`.
    pub fn solve<F>(&self, start_jd: f64, target: f64, mut sample: F) -> Result<f64>
    where
        F: FnMut(f64) -> Result<(f64, f64)>,
    {
        let mut jd = start_jd;
        for iteration in 0..self.max_iterations {
            let (longitude, speed) = sample(jd)?;
            let mut diff = signed_delta(longitude, target);
            if diff.abs() < self.tolerance_deg {
                trace!(iteration, jd, "Root found");
                return Ok(jd);
            }
            if speed.abs() < self.stall_speed {
                return Err(ChartError::Stalled { jd, speed });
            }
            if iteration == 0 && diff / speed < 0.0 {
                diff += 360.0_f64.copysign(speed);
            }
            jd += diff / speed;
        }
        Err(ChartError::NonConvergence {
            iterations: self.max_iterations,
        })
    }
}
