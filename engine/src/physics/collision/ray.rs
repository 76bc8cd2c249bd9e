//! Pick rays supplied by the camera layer

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Ray for picking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Not normalised; plane hits are solved in units of this vector
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, keeping `direction` as given
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Parameter at which the ray reaches height `z`
    pub fn t_at_height(&self, z: f32) -> f32 {
        (z - self.origin.z) / self.direction.z
    }
}
