//! Game action definitions
//!
//! Gameplay code asks about actions, never about keys. The key bindings live
//! in `InputState`.

/// All game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Dash,
}
