//! Keyboard input mapped to game actions.

mod actions;
mod state;

pub use actions::Action;
pub use state::{InputState, TickInput};
