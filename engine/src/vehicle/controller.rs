//! Control signal sources for vehicles
//!
//! AI vehicles chase a randomly chosen opponent; player vehicles take their
//! signals from [`InputState`](crate::input::InputState).

use super::{Vehicle, VehicleId};
use crate::math::{raw_heading, sign};
use crate::simulation::Roster;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::FRAC_PI_2;

/// What drives a vehicle
#[derive(Debug, Clone, PartialEq)]
pub enum Controller {
    Ai(AiState),
    Player(PlayerState),
}

impl Controller {
    pub fn ai() -> Self {
        Controller::Ai(AiState::default())
    }

    pub fn player() -> Self {
        Controller::Player(PlayerState::default())
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Controller::Player(_))
    }
}

/// Steering AI memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiState {
    /// Vehicle being chased; revalidated every tick
    pub target: Option<VehicleId>,
}

/// Player controller memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    /// Jump button state seen last tick
    jump_held: bool,
}

impl PlayerState {
    /// Returns true on a jump press edge while grounded
    pub fn take_jump(&mut self, pressed: bool, grounded: bool) -> bool {
        let edge = pressed && !self.jump_held;
        self.jump_held = pressed;
        edge && grounded
    }
}

/// Control signals chosen by the AI for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiPlan {
    pub target: VehicleId,
    pub throttle: f32,
    /// `None` when the target sits exactly on top of the vehicle
    pub steer: Option<f32>,
}

/// Whether `candidate` can be chased by `me`
fn is_valid_target(me: &Vehicle, candidate: Option<&Vehicle>) -> bool {
    candidate.is_some_and(|other| other.id() != me.id() && other.is_enabled())
}

/// Plan the next tick for an AI vehicle.
///
/// Returns `None` when there is nothing to chase: fewer than two live
/// vehicles, or every other vehicle is already eliminated.
pub fn plan_ai<R: Rng + ?Sized>(me: &Vehicle, roster: &Roster, rng: &mut R) -> Option<AiPlan> {
    if roster.live_count() < 2 {
        return None;
    }

    let current = me.target().and_then(|id| roster.get(id));
    let target = if is_valid_target(me, current) {
        current?
    } else {
        // Uniform over the same set a retry-until-valid loop would accept
        let candidates: Vec<&Vehicle> = roster
            .live()
            .filter(|other| is_valid_target(me, Some(other)))
            .collect();
        *candidates.choose(rng)?
    };

    let bearing = (target.position() - me.position()).truncate();
    let distance = bearing.length();
    let throttle = (1.0 / distance).min(1.0);

    if distance <= f32::EPSILON {
        return Some(AiPlan {
            target: target.id(),
            throttle,
            steer: None,
        });
    }

    let tuning = &me.tuning;
    // Against the raw yaw direction, which is a quarter turn right of travel:
    // positive when the target is to the right, negative when to the left
    let side = bearing
        .normalize()
        .dot(raw_heading(me.yaw()).truncate().normalize())
        .clamp(-1.0, 1.0);
    let angle = side.acos() - FRAC_PI_2;

    let reachable = angle.abs() < tuning.steer_max && angle.abs() > tuning.steer_min;
    let steer = if reachable {
        angle.clamp(tuning.steer_min, tuning.steer_max)
    } else {
        // Too sharp to aim at directly: full lock toward the target
        -sign(side) * tuning.steer_max
    };

    Some(AiPlan {
        target: target.id(),
        throttle,
        steer: Some(steer),
    })
}
