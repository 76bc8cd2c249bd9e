//! Fixed timestep accumulator
//!
//! Converts variable frame times into a whole number of fixed simulation
//! steps, carrying the remainder over to the next frame.

use tracing::warn;

/// Accumulator for running the simulation at a fixed rate
#[derive(Debug, Clone)]
pub struct FixedStepper {
    /// Time carried over from previous frames
    accumulated: f32,
    /// Length of one simulation step in seconds
    pub fixed_timestep: f32,
    /// Upper bound on steps returned for a single frame
    pub max_steps: u32,
}

impl FixedStepper {
    /// Create a new stepper with the given fixed timestep
    pub fn new(fixed_timestep: f32, max_steps: u32) -> Self {
        Self {
            accumulated: 0.0,
            fixed_timestep,
            max_steps,
        }
    }

    /// Add elapsed frame time.
    /// Returns the number of fixed steps to run now.
    pub fn accumulate(&mut self, elapsed: f32) -> u32 {
        self.accumulated += elapsed;

        // A long stall would otherwise queue up an unbounded burst of steps
        let cap = self.fixed_timestep * self.max_steps as f32;
        if self.accumulated > cap {
            warn!(
                accumulated = self.accumulated,
                max_steps = self.max_steps,
                "Frame time exceeds step budget, dropping excess"
            );
            self.accumulated = cap;
        }

        let steps = (self.accumulated / self.fixed_timestep) as u32;
        self.accumulated -= steps as f32 * self.fixed_timestep;

        steps
    }

    /// Fraction of a step left over, in [0, 1], for render interpolation
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulated / self.fixed_timestep
    }

    pub fn accumulated_time(&self) -> f32 {
        self.accumulated
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 8)
    }
}
