//! Ambient conditions for a solve.
//!
//! Flat-earth, still air: temperature, pressure and the density derived from
//! them with the ideal-gas approximation, plus a signed gravity term.

use crate::constants::{
    GAMMA_AIR, G_ACCEL_MPS2, KELVIN_OFFSET, R_SPECIFIC_AIR, STANDARD_PRESSURE_PA,
    STANDARD_TEMPERATURE_K,
};
use crate::error::require_positive;
use crate::BallisticsError;

/// Ambient conditions affecting the trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentData {
    /// Air temperature (K)
    pub temperature_k: f64,
    /// Gravitational acceleration (m/s²), negative points down
    pub gravity: f64,
    /// Air density (kg/m³)
    pub air_density: f64,
    /// Air pressure (Pa)
    pub air_pressure: f64,
}

impl EnvironmentData {
    /// Build an environment and derive its density from temperature and pressure
    pub fn new(temperature_k: f64, air_pressure: f64, gravity: f64) -> Self {
        let mut environment = Self {
            temperature_k,
            gravity,
            air_density: 0.0,
            air_pressure,
        };
        environment.update_air_density_from_t_and_p();
        environment
    }

    /// Ideal-gas density: `pressure / (R * T)`
    pub fn update_air_density_from_t_and_p(&mut self) {
        self.air_density = self.air_pressure / (R_SPECIFIC_AIR * self.temperature_k);
    }

    pub fn temperature_c(&self) -> f64 {
        kelvin_to_celsius(self.temperature_k)
    }

    pub fn speed_of_sound(&self) -> f64 {
        speed_of_sound(self.temperature_k)
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        require_positive("temperature_k", self.temperature_k)?;
        require_positive("air_pressure", self.air_pressure)?;
        require_positive("air_density", self.air_density)?;
        if !self.gravity.is_finite() {
            return Err(BallisticsError::invalid_input("gravity", self.gravity, "must be finite"));
        }
        Ok(())
    }
}

impl Default for EnvironmentData {
    /// ICAO standard atmosphere at sea level
    fn default() -> Self {
        Self::new(STANDARD_TEMPERATURE_K, STANDARD_PRESSURE_PA, -G_ACCEL_MPS2)
    }
}

/// Speed of sound (m/s) in dry air at the given temperature (K)
pub fn speed_of_sound(temperature_k: f64) -> f64 {
    (GAMMA_AIR * R_SPECIFIC_AIR * temperature_k).sqrt()
}

pub fn kelvin_to_celsius(temperature_k: f64) -> f64 {
    temperature_k - KELVIN_OFFSET
}

pub fn celsius_to_kelvin(temperature_c: f64) -> f64 {
    temperature_c + KELVIN_OFFSET
}
