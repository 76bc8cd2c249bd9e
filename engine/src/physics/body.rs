//! Kinematic body integration
//!
//! Explicit Euler over position and a yaw-only angular state, with the ground
//! plane at z = 0 acting as a floor.

use crate::math::wrap_euler;
use crate::physics::collision::OrientedBox;
use glam::Vec3;
use tracing::trace;

/// Position/velocity state of a single simulated entity
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Euler rotation; only z (yaw) is meaningful
    pub rotation: Vec3,
    pub angular_velocity: Vec3,
    pub angular_acceleration: Vec3,
    /// Push from last frame's collision, consumed by the next integration
    pub collision_force: Vec3,
    /// Collision volume, moved to the new pose after every integration
    pub bounds: OrientedBox,
}

impl KinematicBody {
    /// Create a body at rest with `initial_acceleration` (usually gravity)
    pub fn new(position: Vec3, yaw: f32, bounds: OrientedBox, initial_acceleration: Vec3) -> Self {
        let mut body = Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: initial_acceleration,
            rotation: Vec3::new(0.0, 0.0, yaw),
            angular_velocity: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            collision_force: Vec3::ZERO,
            bounds,
        };
        body.bounds.update(body.position, yaw);
        body
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.z
    }

    /// Whether the body rests on (or below) the ground plane
    pub fn is_grounded(&self) -> bool {
        self.position.z <= 0.0
    }

    /// Advance the body by `dt` seconds
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += dt * self.acceleration;
        self.velocity += dt * self.collision_force;
        self.collision_force = Vec3::ZERO;

        if self.is_grounded() {
            // The floor stops downward motion without bouncing
            self.velocity.z = self.velocity.z.max(0.0);
        }

        self.position += dt * self.velocity;
        self.position.z = self.position.z.max(0.0);

        self.angular_velocity += dt * self.angular_acceleration;
        self.rotation += dt * self.angular_velocity;
        self.rotation = wrap_euler(self.rotation);

        self.bounds.update(self.position, self.rotation.z);

        trace!(
            position = ?self.position,
            velocity = ?self.velocity,
            yaw = self.rotation.z,
            "Integrated body"
        );
    }
}
