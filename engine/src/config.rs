//! Configuration types for the simulation

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Per-vehicle handling constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    /// Acceleration at full throttle
    pub throttle_force: f32,
    /// Deceleration at full brake (reverses once stopped)
    pub brake_force: f32,
    /// Scale from steer angle to wheel angle
    pub steer_force: f32,
    pub steer_min: f32,
    pub steer_max: f32,
    /// Wheelbase term in the bicycle model
    pub wheel_diameter: f32,
    /// Rolling resistance coefficient
    pub rolling_resistance: f32,
    /// Aerodynamic drag coefficient
    pub drag: f32,
    /// Saturation bound for horizontal acceleration
    pub max_acceleration: f32,
    pub gravity: Vec3,
    /// Bumps an AI vehicle survives
    pub ai_health: u32,
    /// Bumps the player vehicle survives
    pub player_health: u32,
    /// Steer change per second while a turn button is held
    pub steer_rate: f32,
    /// Steer change per unit of horizontal pointer movement
    pub pointer_steer_scale: f32,
    /// Vertical speed added by a jump
    pub jump_speed: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            throttle_force: 10.0,
            brake_force: 5.0,
            steer_force: 1.0,
            steer_min: -FRAC_PI_4,
            steer_max: FRAC_PI_4,
            wheel_diameter: 1.0,
            rolling_resistance: 0.02,
            drag: 0.025,
            max_acceleration: 100.0,
            gravity: Vec3::new(0.0, 0.0, -9.8),
            ai_health: 2,
            player_health: 10,
            steer_rate: 2.0,
            pointer_steer_scale: 1.0,
            jump_speed: 5.0,
        }
    }
}

/// Top-level simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Length of one simulation step in seconds
    pub fixed_timestep: f32,
    /// Most steps run for a single rendered frame
    pub max_steps_per_frame: u32,
    /// End a player run on the first hit the player takes
    pub sudden_death: bool,
    pub tuning: VehicleTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_steps_per_frame: 8,
            sudden_death: true,
            tuning: VehicleTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading simulation config");
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the values the simulation cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_timestep.is_nan() || self.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_steps_per_frame must be at least 1".to_string(),
            ));
        }
        let tuning = &self.tuning;
        if tuning.steer_min > tuning.steer_max {
            return Err(ConfigError::Invalid(format!(
                "steering range is inverted: [{}, {}]",
                tuning.steer_min, tuning.steer_max
            )));
        }
        if tuning.ai_health == 0 || tuning.player_health == 0 {
            return Err(ConfigError::Invalid(
                "starting health must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
