//! Vehicles: kinematic body, control signals, and health
//!
//! A vehicle integrates a simple bicycle model while on the ground and falls
//! ballistically while in the air. Control signals come from its
//! [`Controller`], either the steering AI or player input.

pub mod controller;

pub use controller::{AiPlan, AiState, Controller, PlayerState};

use crate::config::VehicleTuning;
use crate::input::InputState;
use crate::math::{self, sign};
use crate::physics::{KinematicBody, OrientedBox};
use glam::{Affine3A, EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;
use tracing::debug;

/// Stable handle to a vehicle in the roster arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub usize);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Names of the scene transforms that make up one vehicle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VehicleParts {
    pub root: String,
    pub chassis: String,
    pub wheel_front_left: String,
    pub wheel_front_right: String,
    pub wheel_back_left: String,
    pub wheel_back_right: String,
}

/// Local rotations for the animated parts of a vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelPose {
    /// Rocking of the body while driving
    pub chassis: Quat,
    pub front_left: Quat,
    pub front_right: Quat,
    pub back_left: Quat,
    pub back_right: Quat,
}

/// A simulated vehicle
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    name: String,
    pub parts: VehicleParts,
    pub body: KinematicBody,
    pub controller: Controller,
    pub tuning: VehicleTuning,
    enabled: bool,
    health: u32,
    /// In [0, 1]
    pub throttle: f32,
    /// In [0, 1]
    pub brake: f32,
    /// Front wheel angle in radians, within the tuning's steering range
    pub steer: f32,
    wheel_spin: f32,
    wobble_phase: f32,
}

impl Vehicle {
    /// Create a vehicle at rest; starting health depends on the controller
    pub fn new(
        id: VehicleId,
        name: impl Into<String>,
        position: Vec3,
        yaw: f32,
        bounds: OrientedBox,
        controller: Controller,
        tuning: VehicleTuning,
    ) -> Self {
        let health = if controller.is_player() {
            tuning.player_health
        } else {
            tuning.ai_health
        };
        let name = name.into();
        Self {
            id,
            parts: VehicleParts {
                root: name.clone(),
                ..Default::default()
            },
            name,
            body: KinematicBody::new(position, yaw, bounds, tuning.gravity),
            controller,
            tuning,
            enabled: true,
            health,
            throttle: 0.0,
            brake: 0.0,
            steer: 0.0,
            wheel_spin: 0.0,
            wobble_phase: 0.0,
        }
    }

    /// Set the scene parts this vehicle drives
    pub fn with_parts(mut self, parts: VehicleParts) -> Self {
        self.parts = parts;
        self
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub(crate) fn reassign_id(&mut self, id: VehicleId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    pub fn yaw(&self) -> f32 {
        self.body.yaw()
    }

    /// Direction of travel in the ground plane
    pub fn heading(&self) -> Vec3 {
        math::heading(self.yaw())
    }

    pub fn bounds(&self) -> &OrientedBox {
        &self.body.bounds
    }

    pub fn collided(&self) -> bool {
        self.body.bounds.collided
    }

    pub fn set_collided(&mut self, collided: bool) {
        self.body.bounds.collided = collided;
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_player(&self) -> bool {
        self.controller.is_player()
    }

    /// Current AI target, if this is an AI vehicle with one
    pub fn target(&self) -> Option<VehicleId> {
        match &self.controller {
            Controller::Ai(ai) => ai.target,
            Controller::Player(_) => None,
        }
    }

    /// Mark the vehicle for removal at the end of the frame
    pub fn die(&mut self) {
        if self.enabled {
            debug!(vehicle = %self.name, "Vehicle eliminated");
        }
        self.enabled = false;
    }

    /// Take one bump of damage.
    /// Returns true if this hit eliminated the vehicle.
    pub fn take_hit(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        debug!(vehicle = %self.name, health = self.health, "Vehicle hit");
        if self.health == 0 {
            self.die();
            return true;
        }
        false
    }

    /// Adjust steering, clamped to the steering range
    pub fn turn_wheel(&mut self, delta: f32) {
        self.steer = (self.steer + delta).clamp(self.tuning.steer_min, self.tuning.steer_max);
    }

    /// Horizontal speed, negative when rolling backwards
    pub fn signed_speed(&self) -> f32 {
        let horizontal = Vec3::new(self.body.velocity.x, self.body.velocity.y, 0.0);
        sign(horizontal.dot(self.heading())) * horizontal.length()
    }

    /// Take control signals from the input layer. No-op for AI vehicles.
    pub fn apply_input(&mut self, input: &InputState, dt: f32) {
        let grounded = self.body.is_grounded();
        let jump = match &mut self.controller {
            Controller::Player(player) => {
                player.take_jump(input.is_pressed(crate::input::Button::Jump), grounded)
            }
            Controller::Ai(_) => return,
        };

        let delta = input.steer_axis() * self.tuning.steer_rate * dt
            - input.pointer_delta.x * self.tuning.pointer_steer_scale;
        self.turn_wheel(delta);

        self.throttle = if input.is_pressed(crate::input::Button::Accelerate) {
            1.0
        } else {
            0.0
        };
        self.brake = if input.is_pressed(crate::input::Button::Brake) {
            1.0
        } else {
            0.0
        };

        if jump {
            self.body.velocity.z += self.tuning.jump_speed;
            debug!(vehicle = %self.name, "Jump");
        }
    }

    /// Take control signals from an AI plan
    pub fn apply_plan(&mut self, plan: AiPlan) {
        if let Controller::Ai(ai) = &mut self.controller {
            if ai.target != Some(plan.target) {
                debug!(vehicle = %self.name, target = %plan.target, "New target");
            }
            ai.target = Some(plan.target);
        }
        self.throttle = plan.throttle;
        if let Some(steer) = plan.steer {
            self.steer = steer;
        }
    }

    /// Advance the vehicle by `dt` seconds using its current control signals
    pub fn update(&mut self, dt: f32) {
        let tuning = &self.tuning;
        let heading = self.heading();
        let signed_speed = self.signed_speed();

        self.wobble_phase = (self.wobble_phase + 2.0 * dt).fract();
        self.wheel_spin -= dt * signed_speed;

        let drive = tuning.throttle_force * self.throttle - tuning.brake_force * self.brake;
        let mut acceleration = heading * drive + Vec3::new(0.0, 0.0, self.body.acceleration.z);

        if self.body.is_grounded() {
            let horizontal = Vec3::new(self.body.velocity.x, self.body.velocity.y, 0.0);
            let friction = signed_speed * (tuning.rolling_resistance + tuning.drag * signed_speed);
            acceleration -= horizontal * friction;
            acceleration.x = acceleration
                .x
                .clamp(-tuning.max_acceleration, tuning.max_acceleration);
            acceleration.y = acceleration
                .y
                .clamp(-tuning.max_acceleration, tuning.max_acceleration);

            // No sideways slip: horizontal velocity follows the heading
            self.body.velocity.x = signed_speed * heading.x;
            self.body.velocity.y = signed_speed * heading.y;

            let yaw_rate =
                signed_speed * (tuning.steer_force * self.steer).tan() / tuning.wheel_diameter;
            self.body.angular_velocity = Vec3::new(0.0, 0.0, yaw_rate);
        } else {
            acceleration = tuning.gravity;
        }

        self.body.acceleration = acceleration;
        self.body.integrate(dt);
    }

    /// Rotations for the chassis and wheels at the current state
    pub fn wheel_pose(&self) -> WheelPose {
        let chassis = if self.throttle > 0.0 {
            let tilt = (self.wobble_phase * TAU).sin().to_radians();
            Quat::from_axis_angle(Vec3::Y, tilt)
        } else {
            Quat::IDENTITY
        };
        let spin = Quat::from_rotation_x(self.wheel_spin);
        let front = Quat::from_rotation_z(self.steer) * spin;
        WheelPose {
            chassis,
            front_left: front,
            front_right: front,
            back_left: spin,
            back_right: spin,
        }
    }

    /// Rotation of the whole vehicle
    pub fn rotation(&self) -> Quat {
        let r = self.body.rotation;
        Quat::from_euler(EulerRot::ZYX, r.z, r.y, r.x)
    }

    /// Root transform for drawing the vehicle
    pub fn world_transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation(), self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn test_vehicle(controller: Controller) -> Vehicle {
        Vehicle::new(
            VehicleId(0),
            "sedan",
            Vec3::ZERO,
            0.0,
            OrientedBox::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 1.5)),
            controller,
            VehicleTuning::default(),
        )
    }

    #[test]
    fn test_starting_health_depends_on_controller() {
        assert_eq!(test_vehicle(Controller::ai()).health(), 2);
        assert_eq!(test_vehicle(Controller::player()).health(), 10);
        assert!(test_vehicle(Controller::player()).is_player());
    }

    #[test]
    fn test_turn_wheel_clamps() {
        let mut vehicle = test_vehicle(Controller::player());
        vehicle.turn_wheel(0.5);
        assert_eq!(vehicle.steer, 0.5);
        vehicle.turn_wheel(10.0);
        assert_eq!(vehicle.steer, FRAC_PI_4);
        vehicle.turn_wheel(-10.0);
        assert_eq!(vehicle.steer, -FRAC_PI_4);
    }

    #[test]
    fn test_health_reaches_zero_after_exact_hits() {
        let mut vehicle = test_vehicle(Controller::ai());
        assert!(!vehicle.take_hit());
        assert!(vehicle.is_enabled());
        assert_eq!(vehicle.health(), 1);

        assert!(vehicle.take_hit());
        assert_eq!(vehicle.health(), 0);
        assert!(!vehicle.is_enabled());

        // Already eliminated: no further change
        assert!(!vehicle.take_hit());
        assert_eq!(vehicle.health(), 0);
    }

    #[test]
    fn test_throttle_drives_along_heading() {
        let mut vehicle = test_vehicle(Controller::ai());
        vehicle.throttle = 1.0;
        for _ in 0..60 {
            vehicle.update(1.0 / 60.0);
        }
        // Heading at yaw 0 is +y
        assert!(vehicle.position().y > 0.5);
        assert!(vehicle.position().x.abs() < 1e-4);
        assert_eq!(vehicle.position().z, 0.0);
        assert!(vehicle.signed_speed() > 0.0);
    }

    #[test]
    fn test_brake_reverses_from_rest() {
        let mut vehicle = test_vehicle(Controller::ai());
        vehicle.brake = 1.0;
        for _ in 0..30 {
            vehicle.update(1.0 / 60.0);
        }
        assert!(vehicle.position().y < 0.0);
        assert!(vehicle.signed_speed() < 0.0);
    }

    #[test]
    fn test_velocity_snaps_to_heading_on_ground() {
        let mut vehicle = test_vehicle(Controller::ai());
        vehicle.body.velocity = Vec3::new(3.0, 4.0, 0.0);
        vehicle.update(0.0);
        // Speed 5 forward, all of it along +y
        assert!((vehicle.velocity() - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_steering_turns_left() {
        let mut vehicle = test_vehicle(Controller::ai());
        vehicle.throttle = 1.0;
        vehicle.steer = 0.3;
        for _ in 0..60 {
            vehicle.update(1.0 / 60.0);
        }
        assert!(vehicle.yaw() > 0.0);
        assert!(vehicle.position().x < 0.0);
    }

    #[test]
    fn test_airborne_uses_gravity_only() {
        let mut vehicle = test_vehicle(Controller::ai());
        vehicle.body.position.z = 2.0;
        vehicle.throttle = 1.0;
        vehicle.update(0.1);
        assert_eq!(vehicle.body.acceleration, Vec3::new(0.0, 0.0, -9.8));
        assert_eq!(vehicle.position().y, 0.0);
        assert!(vehicle.position().z < 2.0);
    }

    #[test]
    fn test_jump_fires_once_per_press() {
        let mut vehicle = test_vehicle(Controller::player());
        let mut input = InputState::new();
        input.set_button(Button::Jump, true);

        vehicle.apply_input(&input, 1.0 / 60.0);
        assert_eq!(vehicle.velocity().z, 5.0);

        // Held button: no second impulse
        vehicle.body.velocity.z = 0.0;
        vehicle.apply_input(&input, 1.0 / 60.0);
        assert_eq!(vehicle.velocity().z, 0.0);

        // Release and press again
        input.set_button(Button::Jump, false);
        vehicle.apply_input(&input, 1.0 / 60.0);
        input.set_button(Button::Jump, true);
        vehicle.apply_input(&input, 1.0 / 60.0);
        assert_eq!(vehicle.velocity().z, 5.0);
    }

    #[test]
    fn test_jump_suppressed_while_airborne() {
        let mut vehicle = test_vehicle(Controller::player());
        vehicle.body.position.z = 1.0;
        let mut input = InputState::new();
        input.set_button(Button::Jump, true);
        vehicle.apply_input(&input, 1.0 / 60.0);
        assert_eq!(vehicle.velocity().z, 0.0);
    }

    #[test]
    fn test_player_buttons_set_signals() {
        let mut vehicle = test_vehicle(Controller::player());
        let mut input = InputState::new();
        input.set_button(Button::Accelerate, true);
        input.set_button(Button::SteerLeft, true);
        vehicle.apply_input(&input, 0.1);
        assert_eq!(vehicle.throttle, 1.0);
        assert_eq!(vehicle.brake, 0.0);
        assert!((vehicle.steer - 0.2).abs() < 1e-6);

        input.set_button(Button::Accelerate, false);
        input.set_button(Button::Brake, true);
        input.add_pointer_delta(0.1, 0.0);
        vehicle.apply_input(&input, 0.1);
        assert_eq!(vehicle.throttle, 0.0);
        assert_eq!(vehicle.brake, 1.0);
        // +0.2 from the button, -0.1 from the pointer
        assert!((vehicle.steer - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_ai_ignores_player_input() {
        let mut vehicle = test_vehicle(Controller::ai());
        let mut input = InputState::new();
        input.set_button(Button::Accelerate, true);
        vehicle.apply_input(&input, 0.1);
        assert_eq!(vehicle.throttle, 0.0);
    }

    #[test]
    fn test_wheel_pose_follows_steer() {
        let mut vehicle = test_vehicle(Controller::ai());
        let pose = vehicle.wheel_pose();
        assert_eq!(pose.chassis, Quat::IDENTITY);
        assert_eq!(pose.front_left, Quat::IDENTITY);

        vehicle.steer = FRAC_PI_4;
        let pose = vehicle.wheel_pose();
        let forward = pose.front_left * Vec3::Y;
        assert!((forward - Vec3::new(-FRAC_PI_4.sin(), FRAC_PI_4.cos(), 0.0)).length() < 1e-5);
        assert_eq!(pose.back_left, Quat::IDENTITY);
    }

    #[test]
    fn test_world_transform_places_root() {
        let mut vehicle = test_vehicle(Controller::ai());
        vehicle.body.position = Vec3::new(1.0, 2.0, 0.0);
        vehicle.body.rotation = Vec3::new(0.0, 0.0, FRAC_PI_2);
        let m = vehicle.world_transform();
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-5);
    }
}
