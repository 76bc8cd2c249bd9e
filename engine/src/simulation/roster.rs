//! Vehicle arena with stable ids and a once-per-frame live list

use crate::vehicle::controller::plan_ai;
use crate::vehicle::{Vehicle, VehicleId};
use rand::Rng;
use tracing::debug;

/// All vehicles of a run, indexed by [`VehicleId`].
///
/// Eliminated vehicles keep their slot so stale handles resolve to a disabled
/// vehicle; they only leave the live list when [`Roster::compact`] runs at the
/// end of a frame.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    slots: Vec<Vehicle>,
    live: Vec<VehicleId>,
}

impl Roster {
    /// Build a roster; vehicles are re-keyed by their position in `vehicles`
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        let slots: Vec<Vehicle> = vehicles
            .into_iter()
            .enumerate()
            .map(|(index, mut vehicle)| {
                vehicle.reassign_id(VehicleId(index));
                vehicle
            })
            .collect();
        let live = slots
            .iter()
            .filter(|vehicle| vehicle.is_enabled())
            .map(Vehicle::id)
            .collect();
        Self { slots, live }
    }

    /// Look up any vehicle ever added, eliminated or not
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.slots.get(id.0)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.slots.get_mut(id.0)
    }

    /// Find a vehicle by name
    pub fn find(&self, name: &str) -> Option<&Vehicle> {
        self.slots.iter().find(|vehicle| vehicle.name() == name)
    }

    /// Ids in the live list, in roster order
    pub fn live_ids(&self) -> &[VehicleId] {
        &self.live
    }

    /// Vehicles in the live list. Includes vehicles disabled during the
    /// current frame until the next [`Roster::compact`].
    pub fn live(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.live.iter().filter_map(|id| self.get(*id))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Every vehicle, including eliminated ones
    pub fn all(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.slots.iter()
    }

    /// Refresh an AI vehicle's control signals from the current roster.
    /// Returns false if there was nothing to plan.
    pub fn think<R: Rng + ?Sized>(&mut self, id: VehicleId, rng: &mut R) -> bool {
        let plan = match self.get(id) {
            Some(vehicle) if !vehicle.is_player() => plan_ai(vehicle, self, rng),
            _ => None,
        };
        match (plan, self.get_mut(id)) {
            (Some(plan), Some(vehicle)) => {
                vehicle.apply_plan(plan);
                true
            }
            _ => false,
        }
    }

    /// Drop disabled vehicles from the live list.
    /// Returns the ids removed.
    pub fn compact(&mut self) -> Vec<VehicleId> {
        let slots = &self.slots;
        let (kept, removed): (Vec<VehicleId>, Vec<VehicleId>) = self
            .live
            .iter()
            .partition(|id| slots[id.0].is_enabled());
        if !removed.is_empty() {
            debug!(removed = removed.len(), remaining = kept.len(), "Compacted roster");
        }
        self.live = kept;
        removed
    }
}
