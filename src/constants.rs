//! Physical constants used in trajectory and zeroing calculations

/// Standard gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Conversion factor: grains to kilograms
pub const GRAINS_TO_KG: f64 = 0.00006479891;

/// Conversion factor: meters per second to feet per second
pub const MPS_TO_FPS: f64 = 3.28084;

/// Conversion factor: millimeters squared to meters squared
pub const MM2_TO_M2: f64 = 1.0e-6;

/// Specific gas constant for dry air (J/(kg·K))
///
/// Used both for the ideal-gas density approximation and the speed of sound.
pub const R_SPECIFIC_AIR: f64 = 287.05;

/// Heat capacity ratio for air
pub const GAMMA_AIR: f64 = 1.4;

/// Offset between Kelvin and Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

/// ICAO standard sea-level temperature (K)
pub const STANDARD_TEMPERATURE_K: f64 = 288.15;

/// ICAO standard sea-level pressure (Pa)
pub const STANDARD_PRESSURE_PA: f64 = 101325.0;

/// Nominal .308 Winchester bullet diameter in millimeters
pub const CALIBER_308_MM: f64 = 7.62;

// Numerical stability constants
/// Minimum threshold for preventing division by zero in general calculations
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

// Zero search constants
/// Hard cap on bisection iterations.
///
/// Every iteration halves the angle interval, so 100 iterations is far past
/// the point where an f64 interval over [0, π/2] stops shrinking.
pub const MAX_ZERO_ITERATIONS: usize = 100;

/// The search gives up once the angle interval is narrower than this (radians)
pub const MIN_ZERO_ANGLE_INTERVAL: f64 = 1e-15;

/// Integration step used by the zero search (s)
pub const ZERO_TIME_STEP_S: f64 = 0.01;

/// Flight time limit used by the zero search (s)
pub const ZERO_MAX_TIME_S: f64 = 10.0;

/// Zero tolerance as a fraction of zero distance.
///
/// 2 cm at 100 m, which is roughly one inch at 100 m.
pub const ZERO_TOLERANCE_PER_METER: f64 = 2.0 * 0.01 / 100.0;

/// Most rows `sample_trajectory` will produce for one trajectory
pub const MAX_TRAJECTORY_SAMPLES: usize = 100_000;

/// Minutes of angle per radian
pub const MOA_PER_RADIAN: f64 = 60.0 * 180.0 / std::f64::consts::PI;

/// Milliradians per radian
pub const MRAD_PER_RADIAN: f64 = 1000.0;
