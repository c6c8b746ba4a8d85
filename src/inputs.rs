//! Input parameters for trajectory and zeroing solves.
use crate::constants::{
    CALIBER_308_MM, GRAINS_TO_KG, MM2_TO_M2, ZERO_MAX_TIME_S, ZERO_TIME_STEP_S,
    ZERO_TOLERANCE_PER_METER,
};
use crate::error::require_positive;
use crate::{BallisticsError, DragModel};

/// Physical projectile properties
#[derive(Debug, Clone, PartialEq)]
pub struct BulletData {
    pub mass_gr: f64,
    /// Nominal muzzle velocity from the catalog (m/s)
    pub muzzle_velocity_ms: f64,
    pub g1_bc: f64,
    pub g7_bc: f64,
    pub caliber_mm: f64,
    pub name: String,
    pub description: String,
    pub company: String,
}

impl BulletData {
    pub fn mass_kg(&self) -> f64 {
        self.mass_gr * GRAINS_TO_KG
    }

    /// Frontal area in m²
    pub fn cross_sectional_area(&self) -> f64 {
        std::f64::consts::PI * 0.25 * self.caliber_mm * self.caliber_mm * MM2_TO_M2
    }

    /// Ballistic coefficient published against the given drag model
    pub fn ballistic_coefficient(&self, model: DragModel) -> f64 {
        match model {
            DragModel::G1 => self.g1_bc,
            DragModel::G7 => self.g7_bc,
        }
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        require_positive("mass_gr", self.mass_gr)?;
        require_positive("caliber_mm", self.caliber_mm)?;
        Ok(())
    }
}

impl Default for BulletData {
    /// .308 Winchester 155 gr match bullet
    fn default() -> Self {
        Self {
            mass_gr: 155.0,
            muzzle_velocity_ms: 871.42,
            g1_bc: 0.45,
            g7_bc: 0.275,
            caliber_mm: CALIBER_308_MM,
            name: "155gr HPBT".to_string(),
            description: ".308 155gr hollow point boat tail".to_string(),
            company: String::new(),
        }
    }
}

/// A bullet plus how it is fired
#[derive(Debug, Clone, PartialEq)]
pub struct FiringData {
    pub bullet: BulletData,
    /// Muzzle velocity used by the solvers (m/s)
    pub muzzle_velocity_ms: f64,
    /// Distance at which the trajectory should cross the line of sight (m)
    pub zero_distance_m: f64,
    /// Launch angle above horizontal (radians), written by `zero_in`
    pub zero_angle_rad: f64,
    /// Muzzle height above the ground datum (m)
    pub height_m: f64,
}

impl FiringData {
    /// Fire `bullet` at its catalog muzzle velocity, flat, from ground level
    pub fn new(bullet: BulletData) -> Self {
        Self {
            muzzle_velocity_ms: bullet.muzzle_velocity_ms,
            bullet,
            zero_distance_m: 0.0,
            zero_angle_rad: 0.0,
            height_m: 0.0,
        }
    }

    pub fn with_muzzle_velocity(mut self, muzzle_velocity_ms: f64) -> Self {
        self.muzzle_velocity_ms = muzzle_velocity_ms;
        self
    }

    pub fn with_zero_distance(mut self, zero_distance_m: f64) -> Self {
        self.zero_distance_m = zero_distance_m;
        self
    }

    pub fn with_height(mut self, height_m: f64) -> Self {
        self.height_m = height_m;
        self
    }

    pub fn with_zero_angle(mut self, zero_angle_rad: f64) -> Self {
        self.zero_angle_rad = zero_angle_rad;
        self
    }

    pub fn muzzle_energy_j(&self) -> f64 {
        0.5 * self.bullet.mass_kg() * self.muzzle_velocity_ms * self.muzzle_velocity_ms
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        self.bullet.validate()?;
        require_positive("muzzle_velocity_ms", self.muzzle_velocity_ms)?;
        for (field, value) in [
            ("zero_distance_m", self.zero_distance_m),
            ("zero_angle_rad", self.zero_angle_rad),
            ("height_m", self.height_m),
        ] {
            if !value.is_finite() {
                return Err(BallisticsError::invalid_input(field, value, "must be finite"));
            }
        }
        Ok(())
    }
}

impl Default for FiringData {
    fn default() -> Self {
        Self::new(BulletData::default())
    }
}

/// Default zero tolerance for a zero distance: 2 cm per 100 m
pub fn zero_tolerance_for_distance(zero_distance_m: f64) -> f64 {
    zero_distance_m * ZERO_TOLERANCE_PER_METER
}

/// How velocity is advanced each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverScheme {
    /// RK4 on flight speed, semi-implicit Euler on position
    #[default]
    HybridRk4,
    /// Explicit Euler on each velocity component, drag on the horizontal
    /// one only; semi-implicit Euler on position
    Euler,
}

impl std::str::FromStr for SolverScheme {
    type Err = BallisticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" | "rk4" | "hybrid-rk4" => Ok(SolverScheme::HybridRk4),
            "euler" => Ok(SolverScheme::Euler),
            _ => Err(BallisticsError::Message(format!(
                "unknown solver scheme '{s}', expected hybrid-rk4 or euler"
            ))),
        }
    }
}

/// Integration configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    /// Fixed step (s)
    pub time_step: f64,
    /// Simulation stops once elapsed time reaches this (s)
    pub max_time: f64,
    /// Horizontal distance cutoff (m), 0 = unbounded
    pub max_x: f64,
    pub scheme: SolverScheme,
}

impl SolverParams {
    /// Fixed parameters used by the zero search
    pub fn zeroing() -> Self {
        Self {
            time_step: ZERO_TIME_STEP_S,
            max_time: ZERO_MAX_TIME_S,
            max_x: 0.0,
            scheme: SolverScheme::HybridRk4,
        }
    }

    pub fn with_max_x(mut self, max_x: f64) -> Self {
        self.max_x = max_x;
        self
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(BallisticsError::InvalidSolverParams(format!(
                "time step must be positive, got {}",
                self.time_step
            )));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(BallisticsError::InvalidSolverParams(format!(
                "max time must be positive, got {}",
                self.max_time
            )));
        }
        if !(self.max_x.is_finite() && self.max_x >= 0.0) {
            return Err(BallisticsError::InvalidSolverParams(format!(
                "max distance must be zero or positive, got {}",
                self.max_x
            )));
        }
        Ok(())
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self::zeroing()
    }
}
