//! Input state handed to player-controlled vehicles

mod state;

pub use state::{Button, InputState};
