//! Reporting helpers over a solved trajectory: fixed-distance samples,
//! summary figures and unit conversions.

use crate::constants::{MAX_TRAJECTORY_SAMPLES, MOA_PER_RADIAN, MPS_TO_FPS, MRAD_PER_RADIAN};
use crate::error::require_positive;
use crate::trajectory_solver::TrajectoryDataPoint;
use crate::BallisticsError;

/// Trajectory flags for notable events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrajectoryFlag {
    /// Height changes sign between this sample and the previous one
    ZeroCrossing,
    Apex,
}

impl TrajectoryFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrajectoryFlag::ZeroCrossing => "zero_crossing",
            TrajectoryFlag::Apex => "apex",
        }
    }
}

impl std::fmt::Display for TrajectoryFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single trajectory sample point
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    pub distance_m: f64,
    pub height_m: f64,
    pub velocity_mps: f64,
    pub energy_j: f64,
    pub time_s: f64,
    pub flags: Vec<TrajectoryFlag>,
}

/// Whole-trajectory figures for reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySummary {
    pub max_range_m: f64,
    pub max_height_m: f64,
    /// Distance at which the maximum height is reached
    pub apex_distance_m: f64,
    pub time_of_flight_s: f64,
    pub impact_velocity_mps: f64,
    pub impact_energy_j: f64,
}

impl TrajectorySummary {
    /// `None` for an empty trajectory
    pub fn from_points(points: &[TrajectoryDataPoint], mass_kg: f64) -> Option<Self> {
        let last = points.last()?;
        let apex = points
            .iter()
            .max_by(|a, b| a.height().total_cmp(&b.height()))?;

        Some(Self {
            max_range_m: last.distance(),
            max_height_m: apex.height(),
            apex_distance_m: apex.distance(),
            time_of_flight_s: last.t,
            impact_velocity_mps: last.speed(),
            impact_energy_j: last.kinetic_energy(mass_kg),
        })
    }
}

/// Height at `distance_m`, linearly interpolated between the two samples
/// around it. `None` outside the solved range.
pub fn height_at_distance(points: &[TrajectoryDataPoint], distance_m: f64) -> Option<f64> {
    let x: Vec<f64> = points.iter().map(|p| p.distance()).collect();
    let y: Vec<f64> = points.iter().map(|p| p.height()).collect();
    let (first, last) = (*x.first()?, *x.last()?);
    if distance_m < first || distance_m > last {
        return None;
    }
    Some(interpolate(&x, &y, distance_m))
}

/// Sample a solved trajectory every `step_m` metres of distance.
///
/// Sample distances are multiples of `step_m` that fall inside the solved
/// range; velocity, energy and time are interpolated the same way as height.
/// A step that is not positive, or so small that the range would need more
/// than [`MAX_TRAJECTORY_SAMPLES`] rows, is rejected.
pub fn sample_trajectory(
    points: &[TrajectoryDataPoint],
    mass_kg: f64,
    step_m: f64,
) -> Result<Vec<TrajectorySample>, BallisticsError> {
    require_positive("sample step", step_m)?;
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(Vec::new());
    };
    if (last.distance() - first.distance()) / step_m > MAX_TRAJECTORY_SAMPLES as f64 {
        return Err(BallisticsError::invalid_input(
            "sample step",
            step_m,
            "too small for the solved range",
        ));
    }

    let x_vals: Vec<f64> = points.iter().map(|p| p.distance()).collect();
    let y_vals: Vec<f64> = points.iter().map(|p| p.height()).collect();
    let speeds: Vec<f64> = points.iter().map(|p| p.speed()).collect();
    let energies: Vec<f64> = points.iter().map(|p| p.kinetic_energy(mass_kg)).collect();
    let times: Vec<f64> = points.iter().map(|p| p.t).collect();

    let min_dist = x_vals[0];
    let max_dist = x_vals[x_vals.len() - 1];
    let first_step = (min_dist / step_m).ceil().max(0.0) as usize;
    let last_step = (max_dist / step_m).floor() as usize;

    let mut samples: Vec<TrajectorySample> = (first_step..=last_step)
        .map(|i| i as f64 * step_m)
        .filter(|&d| d >= min_dist && d <= max_dist)
        .map(|distance| TrajectorySample {
            distance_m: distance,
            height_m: interpolate(&x_vals, &y_vals, distance),
            velocity_mps: interpolate(&x_vals, &speeds, distance),
            energy_j: interpolate(&x_vals, &energies, distance),
            time_s: interpolate(&x_vals, &times, distance),
            flags: Vec::new(),
        })
        .collect();

    detect_zero_crossings(&mut samples, 1e-6);

    // Apex only when the trajectory actually turns over inside the range
    if let Some(idx) = apex_index(points) {
        if let Some(sample) = find_closest_sample_index(&samples, points[idx].distance()) {
            samples[sample].flags.push(TrajectoryFlag::Apex);
        }
    }

    Ok(samples)
}

fn apex_index(points: &[TrajectoryDataPoint]) -> Option<usize> {
    let (idx, _) = points
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.height().total_cmp(&b.height()))?;
    (idx > 0 && idx + 1 < points.len()).then_some(idx)
}

/// Linear interpolation over sorted `x_vals`, clamped at both ends
fn interpolate(x_vals: &[f64], y_vals: &[f64], x: f64) -> f64 {
    if x_vals.is_empty() || x_vals.len() != y_vals.len() {
        return 0.0;
    }
    if x <= x_vals[0] {
        return y_vals[0];
    }
    if x >= x_vals[x_vals.len() - 1] {
        return y_vals[y_vals.len() - 1];
    }

    let right = x_vals.partition_point(|&v| v <= x);
    let left = right - 1;
    let (x1, x2) = (x_vals[left], x_vals[right]);
    let (y1, y2) = (y_vals[left], y_vals[right]);

    if (x2 - x1).abs() < f64::EPSILON {
        return y1;
    }
    y1 + (y2 - y1) * (x - x1) / (x2 - x1)
}

fn detect_zero_crossings(samples: &mut [TrajectorySample], tolerance: f64) {
    for i in 0..samples.len() {
        let current = samples[i].height_m;
        let crosses = i > 0 && {
            let previous = samples[i - 1].height_m;
            (previous < -tolerance && current >= -tolerance)
                || (previous > tolerance && current <= tolerance)
        };
        if crosses || current.abs() <= tolerance {
            samples[i].flags.push(TrajectoryFlag::ZeroCrossing);
        }
    }
}

fn find_closest_sample_index(samples: &[TrajectorySample], target_distance: f64) -> Option<usize> {
    if samples.is_empty() {
        return None;
    }
    let right = samples
        .partition_point(|s| s.distance_m < target_distance)
        .min(samples.len() - 1);
    if right > 0
        && (samples[right - 1].distance_m - target_distance).abs()
            < (samples[right].distance_m - target_distance).abs()
    {
        Some(right - 1)
    } else {
        Some(right)
    }
}

pub fn mps_to_fps(speed_mps: f64) -> f64 {
    speed_mps * MPS_TO_FPS
}

pub fn radians_to_moa(angle_rad: f64) -> f64 {
    angle_rad * MOA_PER_RADIAN
}

pub fn radians_to_mrad(angle_rad: f64) -> f64 {
    angle_rad * MRAD_PER_RADIAN
}
