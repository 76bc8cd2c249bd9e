//! Per-frame simulation of a vehicle-combat run
//!
//! Each step runs AI planning, vehicle integration, a collision pass that
//! applies separation forces and damage, and finally compacts eliminated
//! vehicles out of the live list.

mod roster;

pub use roster::Roster;

use crate::config::SimulationConfig;
use crate::input::InputState;
use crate::io::{MeshBounds, SceneManifest, SetupError};
use crate::physics::{FixedStepper, Ray};
use crate::vehicle::{Vehicle, VehicleId};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, trace};

/// Fraction of the separation a partner's heading must point along for a
/// bump to count as a hit. Side-by-side contacts sit at zero and must not
/// tip over on float round-off.
const HIT_TOLERANCE: f32 = 1e-6;

/// How a run is won or lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// A human drives `player`
    Player { player: VehicleId },
    /// Everything is AI; the spectator bets on `target` being eliminated
    Spectator { target: VehicleId },
}

impl GameMode {
    /// The vehicle the run is about
    pub fn focus(&self) -> VehicleId {
        match *self {
            GameMode::Player { player } => player,
            GameMode::Spectator { target } => target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Ended(Outcome),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// Sound the audio layer plays for a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactSound {
    Honk,
    Alien,
}

/// One vehicle bumping into its first overlapping partner
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub vehicle: VehicleId,
    pub partner: VehicleId,
    /// Where `vehicle` was when it collided
    pub position: Vec3,
    /// Whether `vehicle` took damage
    pub hit: bool,
    pub sound: ImpactSound,
}

/// What happened during one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub state: RunState,
    pub events: Vec<CollisionEvent>,
    /// Vehicles removed from the live list this step
    pub eliminated: Vec<VehicleId>,
}

/// A collision found during the scan, applied once the scan is done
struct Contact {
    vehicle: VehicleId,
    partner: VehicleId,
    force: Vec3,
    hit: bool,
}

/// A vehicle-combat run
pub struct Simulation {
    roster: Roster,
    mode: GameMode,
    config: SimulationConfig,
    state: RunState,
    stepper: FixedStepper,
    rng: StdRng,
    frame: u64,
}

impl Simulation {
    /// Create a run over already-built vehicles.
    ///
    /// Vehicles are re-keyed by position, so `mode` must refer to indices
    /// into `vehicles`.
    pub fn new(vehicles: Vec<Vehicle>, mode: GameMode, config: SimulationConfig, rng: StdRng) -> Self {
        let stepper = FixedStepper::new(config.fixed_timestep, config.max_steps_per_frame);
        let roster = Roster::new(vehicles);
        info!(vehicles = roster.live_count(), mode = ?mode, "Starting simulation");
        Self {
            roster,
            mode,
            config,
            state: RunState::Running,
            stepper,
            rng,
            frame: 0,
        }
    }

    /// All-AI run; the target is picked at random
    pub fn spectator(
        scene: &SceneManifest,
        names: &[String],
        meshes: &HashMap<String, MeshBounds>,
        config: SimulationConfig,
        mut rng: StdRng,
    ) -> Result<Self, SetupError> {
        let vehicles = scene.build_vehicles(names, meshes, None, &config.tuning)?;
        let indices: Vec<usize> = (0..vehicles.len()).collect();
        let target = indices
            .choose(&mut rng)
            .copied()
            .map(VehicleId)
            .ok_or(SetupError::EmptyManifest)?;
        info!(target = %vehicles[target.0].name(), "Spectating");
        Ok(Self::new(vehicles, GameMode::Spectator { target }, config, rng))
    }

    /// Run where `player` is driven through [`Simulation::apply_input`]
    pub fn player_match(
        scene: &SceneManifest,
        names: &[String],
        meshes: &HashMap<String, MeshBounds>,
        player: &str,
        config: SimulationConfig,
        rng: StdRng,
    ) -> Result<Self, SetupError> {
        let vehicles = scene.build_vehicles(names, meshes, Some(player), &config.tuning)?;
        let player = vehicles
            .iter()
            .position(|vehicle| vehicle.name() == player)
            .map(VehicleId)
            .ok_or_else(|| SetupError::UnknownPlayer(player.to_string()))?;
        Ok(Self::new(vehicles, GameMode::Player { player }, config, rng))
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Live vehicles, for drawing
    pub fn live(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.roster.live()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.roster.get(id)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Steps run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Leftover fraction of a step after the last [`Simulation::advance`]
    pub fn interpolation_alpha(&self) -> f32 {
        self.stepper.interpolation_alpha()
    }

    /// Feed this frame's input to the player vehicle, if there is one
    pub fn apply_input(&mut self, input: &InputState, dt: f32) {
        if let GameMode::Player { player } = self.mode {
            if let Some(vehicle) = self.roster.get_mut(player) {
                if vehicle.is_enabled() {
                    vehicle.apply_input(input, dt);
                }
            }
        }
    }

    /// Run as many fixed steps as `elapsed` seconds of frame time allow
    pub fn advance(&mut self, elapsed: f32) -> Vec<StepReport> {
        let steps = self.stepper.accumulate(elapsed);
        let mut reports = Vec::with_capacity(steps as usize);
        for _ in 0..steps {
            if !self.state.is_running() {
                break;
            }
            let dt = self.stepper.fixed_timestep;
            reports.push(self.step(dt));
        }
        reports
    }

    /// Run one step of `dt` seconds. Does nothing once the run has ended.
    pub fn step(&mut self, dt: f32) -> StepReport {
        if !self.state.is_running() {
            return StepReport {
                state: self.state,
                events: Vec::new(),
                eliminated: Vec::new(),
            };
        }
        self.frame += 1;
        trace!(frame = self.frame, dt, "Step");

        let live: Vec<VehicleId> = self.roster.live_ids().to_vec();
        for &id in &live {
            self.roster.think(id, &mut self.rng);
        }
        for &id in &live {
            if let Some(vehicle) = self.roster.get_mut(id) {
                vehicle.update(dt);
            }
        }

        let contacts = self.scan_collisions(&live, dt);
        let events = self.apply_contacts(contacts);

        if let GameMode::Player { player } = self.mode {
            self.check_last_standing(player);
        }

        let eliminated = self.roster.compact();
        StepReport {
            state: self.state,
            events,
            eliminated,
        }
    }

    /// Find the first overlapping partner of every live vehicle.
    /// Only reads the roster; nothing changes until the scan is complete.
    fn scan_collisions(&mut self, live: &[VehicleId], dt: f32) -> Vec<Contact> {
        for &id in live {
            if let Some(vehicle) = self.roster.get_mut(id) {
                vehicle.set_collided(false);
            }
        }

        let mut contacts = Vec::new();
        for &a_id in live {
            let Some(a) = self.roster.get(a_id) else {
                continue;
            };
            let partner = live
                .iter()
                .filter(|&&b_id| b_id != a_id)
                .filter_map(|&b_id| self.roster.get(b_id))
                .find(|b| a.bounds().overlaps(b.bounds()) || b.bounds().overlaps(a.bounds()));
            let Some(b) = partner else {
                continue;
            };

            let separation = a.position() - b.position();
            let force = if dt > 0.0 {
                0.5 * separation / dt
            } else {
                Vec3::ZERO
            };
            // Only bumps from a partner driving toward us do damage
            let hit = separation.dot(b.heading()) > HIT_TOLERANCE * separation.length();
            contacts.push(Contact {
                vehicle: a_id,
                partner: b.id(),
                force,
                hit,
            });
        }
        contacts
    }

    fn apply_contacts(&mut self, contacts: Vec<Contact>) -> Vec<CollisionEvent> {
        let focus = self.mode.focus();
        let mut events = Vec::with_capacity(contacts.len());

        for contact in contacts {
            let Some(vehicle) = self.roster.get_mut(contact.vehicle) else {
                continue;
            };
            vehicle.set_collided(true);
            vehicle.body.collision_force = contact.force;
            let position = vehicle.position();
            let eliminated = contact.hit && vehicle.take_hit();

            debug!(
                vehicle = %contact.vehicle,
                partner = %contact.partner,
                hit = contact.hit,
                "Collision"
            );
            events.push(CollisionEvent {
                vehicle: contact.vehicle,
                partner: contact.partner,
                position,
                hit: contact.hit,
                sound: if contact.vehicle == focus {
                    ImpactSound::Honk
                } else {
                    ImpactSound::Alien
                },
            });

            if contact.hit {
                self.on_hit(contact.vehicle);
            }
            if eliminated {
                self.on_eliminated(contact.vehicle);
            }
        }
        events
    }

    /// Cast a ray through the scene; every live vehicle it passes through
    /// is eliminated. Returns the vehicles hit. Does nothing once the run
    /// has ended.
    pub fn pick(&mut self, ray: &Ray) -> Vec<VehicleId> {
        if !self.state.is_running() {
            return Vec::new();
        }
        let live: Vec<VehicleId> = self.roster.live_ids().to_vec();
        let mut hits = Vec::new();
        for id in live {
            let Some(vehicle) = self.roster.get_mut(id) else {
                continue;
            };
            let hit = vehicle.bounds().intersects(ray);
            vehicle.set_collided(hit);
            if hit && vehicle.is_enabled() {
                vehicle.die();
                hits.push(id);
            }
        }

        if !hits.is_empty() {
            debug!(hits = hits.len(), "Picked vehicles");
        }
        for &id in &hits {
            self.on_eliminated(id);
        }
        if let GameMode::Player { player } = self.mode {
            self.check_last_standing(player);
        }
        self.roster.compact();
        hits
    }

    fn on_hit(&mut self, id: VehicleId) {
        if let GameMode::Player { player } = self.mode {
            if id == player && self.config.sudden_death {
                self.finish(Outcome::Loss);
            }
        }
    }

    fn on_eliminated(&mut self, id: VehicleId) {
        match self.mode {
            GameMode::Player { player } if id == player => self.finish(Outcome::Loss),
            GameMode::Player { .. } => {}
            GameMode::Spectator { target } if id == target => self.finish(Outcome::Win),
            GameMode::Spectator { .. } => self.finish(Outcome::Loss),
        }
    }

    fn check_last_standing(&mut self, player: VehicleId) {
        let last = {
            let mut enabled = self.roster.live().filter(|vehicle| vehicle.is_enabled());
            match (enabled.next(), enabled.next()) {
                (Some(only), None) => Some(only.id()),
                _ => None,
            }
        };
        if last == Some(player) {
            self.finish(Outcome::Win);
        }
    }

    /// End the run; the first outcome sticks
    fn finish(&mut self, outcome: Outcome) {
        if self.state.is_running() {
            self.state = RunState::Ended(outcome);
            info!(outcome = ?outcome, frame = self.frame, "Run ended");
        }
    }
}
