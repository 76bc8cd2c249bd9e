//! Headless demolition derby runner
//!
//! Usage: `derby_game [scene.json] [config.json]`
//!
//! Without a scene a demo arena is built in code. Every chassis gets the same
//! mesh bounds since no meshes are loaded here.

use derby_engine::prelude::*;
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::process::ExitCode;
use tracing::{error, info};

/// Simulated seconds before the run is called off
const TIME_LIMIT: f32 = 120.0;
/// Frame time fed to the simulation, as if rendering at 50 Hz
const FRAME_TIME: f32 = 0.02;

const DEMO_VEHICLES: [&str; 6] = ["taxi", "police", "van", "truck", "sedan", "ambulance"];
const WHEELS: [&str; 4] = [
    "wheel_frontLeft",
    "wheel_frontRight",
    "wheel_backLeft",
    "wheel_backRight",
];

fn chassis_bounds() -> MeshBounds {
    MeshBounds::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 1.5))
}

/// Vehicles spread on a circle, all facing the centre
fn demo_scene() -> (SceneManifest, Vec<String>) {
    let mut scene = SceneManifest::new();
    let radius = 15.0;
    for (index, name) in DEMO_VEHICLES.iter().enumerate() {
        let angle = TAU * index as f32 / DEMO_VEHICLES.len() as f32;
        let position = Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0);
        // Yaw 0 drives along +y; turn toward the centre
        let yaw = angle + TAU / 4.0;
        let suffix = format!(".{:03}", index + 1);

        scene.transforms.push(SceneTransform::new(
            *name,
            None,
            position,
            Quat::from_rotation_z(yaw),
        ));
        scene.transforms.push(SceneTransform::new(
            format!("body{suffix}"),
            Some(*name),
            Vec3::ZERO,
            Quat::IDENTITY,
        ));
        for wheel in WHEELS {
            scene.transforms.push(SceneTransform::new(
                format!("{wheel}{suffix}"),
                Some(*name),
                Vec3::ZERO,
                Quat::IDENTITY,
            ));
        }
    }
    scene.cameras.push(SceneCamera {
        transform: "Camera".to_string(),
    });

    let names = DEMO_VEHICLES.iter().map(|name| name.to_string()).collect();
    (scene, names)
}

/// Root transforms are the vehicles
fn vehicle_names(scene: &SceneManifest) -> Vec<String> {
    scene
        .transforms
        .iter()
        .filter(|transform| transform.parent.is_none())
        .filter(|transform| !scene.cameras.iter().any(|camera| camera.transform == transform.name))
        .map(|transform| transform.name.clone())
        .collect()
}

fn run() -> Result<Outcome, Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let scene_path = args.next();
    let config_path = args.next();

    let config = match config_path {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let (scene, names) = match scene_path {
        Some(path) => {
            let scene = SceneManifest::load_from_file(path)?;
            let names = vehicle_names(&scene);
            (scene, names)
        }
        None => demo_scene(),
    };

    let meshes: HashMap<String, MeshBounds> = scene
        .transforms
        .iter()
        .filter(|transform| transform.name.starts_with("body"))
        .map(|transform| (transform.name.clone(), chassis_bounds()))
        .collect();

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let mut sim = Simulation::spectator(&scene, &names, &meshes, config, StdRng::seed_from_u64(seed))?;

    let target = sim.mode().focus();
    if let Some(vehicle) = sim.vehicle(target) {
        info!(target = %vehicle.name(), seed, "Betting on the target being wrecked");
    }

    let mut elapsed = 0.0;
    while elapsed < TIME_LIMIT {
        for report in sim.advance(FRAME_TIME) {
            for id in &report.eliminated {
                if let Some(vehicle) = sim.vehicle(*id) {
                    info!(vehicle = %vehicle.name(), "Wrecked");
                }
            }
        }
        if let RunState::Ended(outcome) = sim.state() {
            return Ok(outcome);
        }
        elapsed += FRAME_TIME;
    }

    info!(remaining = sim.roster().live_count(), "Time limit reached");
    Ok(Outcome::Loss)
}

fn main() -> ExitCode {
    derby_engine::init_logging();
    info!("Starting derby");

    match run() {
        Ok(outcome) => {
            info!(outcome = ?outcome, "Derby finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Derby failed");
            ExitCode::FAILURE
        }
    }
}
