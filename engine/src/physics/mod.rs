//! Kinematic physics for the vehicle simulation
//!
//! There is no solver here: bodies are integrated independently and collision
//! responses are applied as a one-frame push on the next integration.

pub mod accumulator;
pub mod body;
pub mod collision;

// Re-export commonly used types
pub use accumulator::FixedStepper;
pub use body::KinematicBody;
pub use collision::{OrientedBox, Ray};
