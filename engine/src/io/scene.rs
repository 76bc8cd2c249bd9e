//! Scene manifests and vehicle setup

use crate::config::VehicleTuning;
use crate::physics::OrientedBox;
use crate::vehicle::{Controller, Vehicle, VehicleId, VehicleParts};
use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of the chassis transform; whatever follows it is the vehicle's suffix
const CHASSIS_PREFIX: &str = "body";

/// Errors that abort simulation setup
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No vehicles requested")]
    EmptyManifest,

    #[error("Unable to find vehicle \"{0}\" in scene")]
    MissingVehicle(String),

    #[error("Unable to find {vehicle}'s \"{component}\" in scene")]
    MissingComponent { vehicle: String, component: String },

    #[error("No mesh bounds for {vehicle}'s chassis \"{mesh}\"")]
    MissingMesh { vehicle: String, mesh: String },

    #[error("Player vehicle \"{0}\" is not in the vehicle list")]
    UnknownPlayer(String),

    #[error("Expecting scene to have exactly one camera, but it has {0}")]
    CameraCount(usize),
}

/// A named transform in the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTransform {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
}

impl SceneTransform {
    pub fn new(name: impl Into<String>, parent: Option<&str>, position: Vec3, rotation: Quat) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            position,
            rotation,
        }
    }
}

/// A camera attached to a scene transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCamera {
    pub transform: String,
}

/// Untransformed bounds of a mesh, supplied by the asset loader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl MeshBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
}

/// The parts of a loaded scene the simulation needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default)]
    pub transforms: Vec<SceneTransform>,
    #[serde(default)]
    pub cameras: Vec<SceneCamera>,
}

impl SceneManifest {
    /// Create a new empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a manifest from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SetupError> {
        let path = path.as_ref();
        info!(path = ?path, "Loading scene manifest");
        let json = fs::read_to_string(path)?;
        let manifest = Self::from_json_str(&json)?;
        debug!(
            transforms = manifest.transforms.len(),
            cameras = manifest.cameras.len(),
            "Loaded scene manifest"
        );
        Ok(manifest)
    }

    /// Save the manifest to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SetupError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// First transform with the given name
    pub fn find(&self, name: &str) -> Option<&SceneTransform> {
        self.transforms.iter().find(|transform| transform.name == name)
    }

    /// The single camera of the scene
    pub fn camera(&self) -> Result<&SceneCamera, SetupError> {
        match self.cameras.as_slice() {
            [camera] => Ok(camera),
            cameras => Err(SetupError::CameraCount(cameras.len())),
        }
    }

    /// Suffix shared by the parts of `vehicle`, taken from its chassis child
    fn part_suffix(&self, vehicle: &str) -> Option<&str> {
        self.transforms
            .iter()
            .filter(|transform| transform.parent.as_deref() == Some(vehicle))
            .find_map(|transform| transform.name.strip_prefix(CHASSIS_PREFIX))
    }

    fn part(&self, vehicle: &str, component: String) -> Result<String, SetupError> {
        match self.find(&component) {
            Some(transform) => Ok(transform.name.clone()),
            None => Err(SetupError::MissingComponent {
                vehicle: vehicle.to_string(),
                component,
            }),
        }
    }

    /// Resolve every part of one vehicle
    pub fn vehicle_parts(&self, vehicle: &str) -> Result<VehicleParts, SetupError> {
        if self.find(vehicle).is_none() {
            return Err(SetupError::MissingVehicle(vehicle.to_string()));
        }
        let suffix = self
            .part_suffix(vehicle)
            .ok_or_else(|| SetupError::MissingComponent {
                vehicle: vehicle.to_string(),
                component: CHASSIS_PREFIX.to_string(),
            })?;

        Ok(VehicleParts {
            root: vehicle.to_string(),
            chassis: self.part(vehicle, format!("{CHASSIS_PREFIX}{suffix}"))?,
            wheel_front_left: self.part(vehicle, format!("wheel_frontLeft{suffix}"))?,
            wheel_front_right: self.part(vehicle, format!("wheel_frontRight{suffix}"))?,
            wheel_back_left: self.part(vehicle, format!("wheel_backLeft{suffix}"))?,
            wheel_back_right: self.part(vehicle, format!("wheel_backRight{suffix}"))?,
        })
    }

    /// Build one vehicle per name, in order.
    ///
    /// `meshes` maps chassis transform names to their mesh bounds. The vehicle
    /// named `player`, if any, is player-controlled; the rest are AI.
    pub fn build_vehicles(
        &self,
        names: &[String],
        meshes: &HashMap<String, MeshBounds>,
        player: Option<&str>,
        tuning: &VehicleTuning,
    ) -> Result<Vec<Vehicle>, SetupError> {
        if names.is_empty() {
            return Err(SetupError::EmptyManifest);
        }
        if let Some(player) = player {
            if !names.iter().any(|name| name == player) {
                return Err(SetupError::UnknownPlayer(player.to_string()));
            }
        }
        self.camera()?;

        let mut vehicles = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let parts = self.vehicle_parts(name)?;
            let mesh = meshes
                .get(&parts.chassis)
                .ok_or_else(|| SetupError::MissingMesh {
                    vehicle: name.clone(),
                    mesh: parts.chassis.clone(),
                })?;
            let root = self
                .find(name)
                .ok_or_else(|| SetupError::MissingVehicle(name.clone()))?;

            // Only yaw survives; vehicles are never pitched or rolled
            let (yaw, _, _) = root.rotation.to_euler(EulerRot::ZYX);
            let controller = if player == Some(name.as_str()) {
                Controller::player()
            } else {
                Controller::ai()
            };

            debug!(vehicle = %name, chassis = %parts.chassis, position = ?root.position, "Built vehicle");
            vehicles.push(
                Vehicle::new(
                    VehicleId(index),
                    name.clone(),
                    root.position,
                    yaw,
                    OrientedBox::new(mesh.min, mesh.max),
                    controller,
                    tuning.clone(),
                )
                .with_parts(parts),
            );
        }

        info!(count = vehicles.len(), "Built vehicles from scene");
        Ok(vehicles)
    }
}
