//! Bisection search for the zero angle.

use std::f64::consts::FRAC_PI_2;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::atmosphere::EnvironmentData;
use crate::constants::{MAX_ZERO_ITERATIONS, MIN_ZERO_ANGLE_INTERVAL};
use crate::drag::DragTable;
use crate::inputs::{zero_tolerance_for_distance, FiringData, SolverParams};
use crate::trajectory_sampling::{radians_to_moa, radians_to_mrad};
use crate::trajectory_solver::TrajectorySolver;
use crate::BallisticsError;

/// How a zero search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroStatus {
    /// Height and stopping distance both within tolerance of the target
    Converged,
    /// Height within tolerance, but the last step overshot the distance
    /// window; bisection cannot narrow this any further
    OutsideWindow,
    /// Gave up after the iteration cap or once the angle interval collapsed
    IterationLimit,
    /// Zero distance was not positive; nothing was searched
    NotApplicable,
}

impl ZeroStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZeroStatus::Converged => "converged",
            ZeroStatus::OutsideWindow => "outside_window",
            ZeroStatus::IterationLimit => "iteration_limit",
            ZeroStatus::NotApplicable => "not_applicable",
        }
    }
}

impl std::fmt::Display for ZeroStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a zero search
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroResult {
    pub status: ZeroStatus,
    pub angle_rad: f64,
    /// Number of trial trajectories run
    pub iterations: usize,
    /// Horizontal distance where the final trial stopped (m)
    pub distance_m: f64,
    /// Height at that point, measured from a muzzle placed at the tolerance (m)
    pub height_m: f64,
}

impl ZeroResult {
    fn not_applicable(angle_rad: f64) -> Self {
        Self {
            status: ZeroStatus::NotApplicable,
            angle_rad,
            iterations: 0,
            distance_m: 0.0,
            height_m: 0.0,
        }
    }

    /// The angle can be used as a zero
    pub fn is_success(&self) -> bool {
        matches!(self.status, ZeroStatus::Converged | ZeroStatus::OutsideWindow)
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_rad.to_degrees()
    }

    pub fn angle_moa(&self) -> f64 {
        radians_to_moa(self.angle_rad)
    }

    pub fn angle_mrad(&self) -> f64 {
        radians_to_mrad(self.angle_rad)
    }
}

impl FiringData {
    /// Find the launch angle that brings the projectile back to the line of
    /// sight at `zero_distance_m`, within `tolerance_m`.
    ///
    /// On success (and on giving up) the angle is written to
    /// `zero_angle_rad`. `height_m` is never touched: the search runs on a
    /// copy whose muzzle sits at `tolerance_m`.
    pub fn zero_in(
        &mut self,
        table: &DragTable,
        tolerance_m: f64,
        environment: &EnvironmentData,
    ) -> Result<ZeroResult, BallisticsError> {
        self.zero_in_with_params(table, tolerance_m, environment, &SolverParams::zeroing())
    }

    /// [`zero_in`](Self::zero_in) with caller-supplied step and time limit.
    /// `params.max_x` is ignored.
    pub fn zero_in_with_params(
        &mut self,
        table: &DragTable,
        tolerance_m: f64,
        environment: &EnvironmentData,
        params: &SolverParams,
    ) -> Result<ZeroResult, BallisticsError> {
        if self.zero_distance_m <= 0.0 {
            debug!("zero distance {} m, skipping zero search", self.zero_distance_m);
            return Ok(ZeroResult::not_applicable(self.zero_angle_rad));
        }
        if !(tolerance_m.is_finite() && tolerance_m > 0.0) {
            return Err(BallisticsError::InvalidTolerance(tolerance_m));
        }
        self.validate()?;
        environment.validate()?;
        params.validate()?;

        let params = SolverParams { max_x: 0.0, ..*params };
        let target = self.zero_distance_m;
        let stop_x = target - tolerance_m;

        let mut trial = self.clone().with_height(tolerance_m);
        let mut solver = TrajectorySolver::new(table, &trial, environment, &params);
        let mut min_angle = 0.0;
        let mut max_angle = FRAC_PI_2;
        let mut iterations = 0;

        while iterations < MAX_ZERO_ITERATIONS {
            iterations += 1;
            trial.zero_angle_rad = 0.5 * (min_angle + max_angle);
            solver.reset(&trial);
            while !solver.completed() && solver.state().distance() < stop_x {
                solver.advance();
            }

            let state = *solver.state();
            debug!(
                "zero iteration {}: angle = {:.8} rad, x = {:.3} m, y = {:.5} m",
                iterations,
                trial.zero_angle_rad,
                state.distance(),
                state.height()
            );

            if state.height().abs() > tolerance_m || state.distance() < target {
                if state.height() < 0.0 {
                    min_angle = trial.zero_angle_rad;
                } else {
                    max_angle = trial.zero_angle_rad;
                }
                if max_angle - min_angle < MIN_ZERO_ANGLE_INTERVAL {
                    break;
                }
                continue;
            }

            let status = if (state.distance() - target).abs() <= tolerance_m {
                ZeroStatus::Converged
            } else {
                ZeroStatus::OutsideWindow
            };
            self.zero_angle_rad = trial.zero_angle_rad;
            info!(
                "zeroed at {:.1} m: angle = {:.8} rad after {} iterations ({:?})",
                target, self.zero_angle_rad, iterations, status
            );
            return Ok(ZeroResult {
                status,
                angle_rad: self.zero_angle_rad,
                iterations,
                distance_m: state.distance(),
                height_m: state.height(),
            });
        }

        let state = *solver.state();
        self.zero_angle_rad = trial.zero_angle_rad;
        warn!(
            "zero search for {:.1} m did not converge after {} iterations, last angle {:.8} rad stopped at x = {:.3} m, y = {:.5} m",
            target,
            iterations,
            self.zero_angle_rad,
            state.distance(),
            state.height()
        );
        Ok(ZeroResult {
            status: ZeroStatus::IterationLimit,
            angle_rad: self.zero_angle_rad,
            iterations,
            distance_m: state.distance(),
            height_m: state.height(),
        })
    }
}

/// Zero `firing` at each of `distances` in parallel, each with the default
/// tolerance for its distance. Results are in the order of `distances`;
/// non-positive distances come back as [`ZeroStatus::NotApplicable`].
pub fn zero_table(
    firing: &FiringData,
    table: &DragTable,
    environment: &EnvironmentData,
    distances: &[f64],
) -> Result<Vec<ZeroResult>, BallisticsError> {
    distances
        .par_iter()
        .map(|&distance| {
            let mut copy = firing.clone().with_zero_distance(distance);
            copy.zero_in(table, zero_tolerance_for_distance(distance), environment)
        })
        .collect()
}
