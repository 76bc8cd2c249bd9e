//! Simulation core for a top-down vehicle-combat game
//!
//! This crate provides the fixed-step gameplay simulation: kinematic vehicle
//! bodies, oriented-box collision and picking, steering AI, player input, and
//! the per-frame combat rules. Rendering, audio, and asset loading live
//! outside; they read poses and events from the [`simulation::Simulation`].

pub mod config;
pub mod input;
pub mod io;
pub mod math;
pub mod physics;
pub mod simulation;
pub mod vehicle;

// Re-export commonly used types
pub mod prelude {
    // Math types
    pub use glam::{Affine3A, Quat, Vec2, Vec3};

    // Physics types
    pub use crate::physics::{FixedStepper, KinematicBody, OrientedBox, Ray};

    // Vehicle types
    pub use crate::vehicle::{Controller, Vehicle, VehicleId, VehicleParts, WheelPose};

    // Simulation types
    pub use crate::simulation::{
        CollisionEvent, GameMode, ImpactSound, Outcome, Roster, RunState, Simulation, StepReport,
    };

    // IO types
    pub use crate::io::{MeshBounds, SceneCamera, SceneManifest, SceneTransform, SetupError};

    // Config types
    pub use crate::config::{ConfigError, SimulationConfig, VehicleTuning};

    // Input types
    pub use crate::input::{Button, InputState};
}

/// Initialize logging for the engine
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
