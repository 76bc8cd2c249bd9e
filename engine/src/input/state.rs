//! Input state tracking

use glam::Vec2;
use std::collections::HashSet;
use tracing::trace;

/// Logical buttons the player controller understands.
///
/// Mapping physical keys onto these is left to the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    Jump,
}

/// Tracks the current state of player input
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Currently held buttons
    pub buttons_pressed: HashSet<Button>,
    /// Pointer movement since last frame
    pub pointer_delta: Vec2,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame data (like pointer delta)
    pub fn clear_frame_data(&mut self) {
        self.pointer_delta = Vec2::ZERO;
    }

    /// Record a button press or release
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons_pressed.insert(button);
            trace!("Button pressed: {:?}", button);
        } else {
            self.buttons_pressed.remove(&button);
            trace!("Button released: {:?}", button);
        }
    }

    /// Add pointer movement
    pub fn add_pointer_delta(&mut self, dx: f32, dy: f32) {
        self.pointer_delta += Vec2::new(dx, dy);
        trace!("Pointer delta: ({}, {})", dx, dy);
    }

    /// Check if a button is currently held
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Steering direction from the turn buttons: +1 left, -1 right, 0 both or neither
    pub fn steer_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_pressed(Button::SteerLeft) {
            axis += 1.0;
        }
        if self.is_pressed(Button::SteerRight) {
            axis -= 1.0;
        }
        axis
    }
}
