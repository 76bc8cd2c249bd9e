//! Angle and yaw helpers shared by the physics and controller code

use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Rotate a vector about the vertical (z) axis by `yaw` radians
pub fn rotate_yaw(yaw: f32, v: Vec3) -> Vec3 {
    Quat::from_rotation_z(yaw) * v
}

/// Shift `x` back into `[min, max]` by a single period.
///
/// This is not a modulo: a value more than one period out of range stays out
/// of range. Assumes a symmetric range such as `[-PI, PI]`.
pub fn wrap_once(x: f32, min: f32, max: f32) -> f32 {
    let mut wrapped = x;
    if wrapped > max {
        wrapped -= 2.0 * max;
    }
    if wrapped < min {
        wrapped -= 2.0 * min;
    }
    wrapped
}

/// Wrap every component of an Euler rotation into `[-PI, PI]`
pub fn wrap_euler(rotation: Vec3) -> Vec3 {
    Vec3::new(
        wrap_once(rotation.x, -PI, PI),
        wrap_once(rotation.y, -PI, PI),
        wrap_once(rotation.z, -PI, PI),
    )
}

/// Direction of travel for a vehicle with the given yaw.
///
/// Vehicle meshes face +y at rest, so travel is a quarter turn ahead of the
/// raw yaw direction.
pub fn heading(yaw: f32) -> Vec3 {
    // Same as raw_heading(yaw + PI/2), without the round-off that leaves a
    // stray x component at yaw 0
    Vec3::new(-yaw.sin(), yaw.cos(), 0.0)
}

/// Unit vector in the xy-plane pointing along `yaw`
pub fn raw_heading(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), yaw.sin(), 0.0)
}

/// Sign of `x` with `sign(0) == 0`, unlike `f32::signum`
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
