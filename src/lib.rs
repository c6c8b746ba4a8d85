//! # Ballistics Zero
//!
//! Point-mass trajectory integration against the G1/G7 standard drag tables,
//! and a bisection search for the launch angle that zeroes a rifle at a
//! chosen distance.
//!
//! ```no_run
//! use ballistics_zero::{
//!     solve_trajectory, zero_tolerance_for_distance, BulletData, DragModel, EnvironmentData,
//!     FiringData, SolverParams,
//! };
//!
//! let env = EnvironmentData::default();
//! let table = DragModel::G7.table();
//! let mut firing = FiringData::new(BulletData::default()).with_zero_distance(200.0);
//! let zero = firing.zero_in(table, zero_tolerance_for_distance(200.0), &env)?;
//! assert!(zero.is_success());
//!
//! let points = solve_trajectory(table, &firing, &env, &SolverParams::default().with_max_x(300.0))?;
//! println!("{} samples", points.len());
//! # Ok::<(), ballistics_zero::BallisticsError>(())
//! ```

// Re-export the main types and functions
pub use angle_calculations::{zero_table, ZeroResult, ZeroStatus};
pub use atmosphere::{celsius_to_kelvin, kelvin_to_celsius, speed_of_sound, EnvironmentData};
pub use drag::{get_drag_coefficient, speed_to_mach, DragTable, G1_DRAG_TABLE, G7_DRAG_TABLE};
pub use drag_model::DragModel;
pub use error::BallisticsError;
pub use inputs::{zero_tolerance_for_distance, BulletData, FiringData, SolverParams, SolverScheme};
pub use integrator::{Derivative, RungeKutta4};
pub use trajectory_sampling::{
    height_at_distance, mps_to_fps, radians_to_moa, radians_to_mrad, sample_trajectory,
    TrajectoryFlag, TrajectorySample, TrajectorySummary,
};
pub use trajectory_solver::{drag_factor, solve_trajectory, TrajectoryDataPoint, TrajectorySolver};

// Module declarations
pub mod constants;
mod error;
mod drag_model;
mod drag;
mod drag_tables;
mod integrator;
mod atmosphere;
mod inputs;
mod trajectory_solver;
mod angle_calculations;
mod trajectory_sampling;
