//! Input state management
//!
//! Polls the keyboard through macroquad and exposes an action-based API.
//! `snapshot()` freezes the current state into a `TickInput` so the fixed-step
//! simulation sees one consistent reading per tick.

use macroquad::prelude::*;

use super::Action;

/// Per-tick input snapshot consumed by the simulation.
///
/// `jump` and `dash` are edge-triggered: true only on the frame the key went
/// down. The main loop clears them after the first tick of a frame so a held
/// key does not retrigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub dash: bool,
}

impl TickInput {
    /// Horizontal movement axis in -1..=1.
    pub fn axis(&self) -> f32 {
        (self.move_right as i32 - self.move_left as i32) as f32
    }

    /// Drop the edge-triggered actions, keeping held movement.
    pub fn without_edges(self) -> Self {
        Self {
            jump: false,
            dash: false,
            ..self
        }
    }
}

/// Keyboard input polled through macroquad.
#[derive(Debug, Default)]
pub struct InputState;

impl InputState {
    pub fn new() -> Self {
        Self
    }

    /// Check if an action is currently held down
    pub fn action_down(&self, action: Action) -> bool {
        self.keys_for(action).iter().any(|&key| is_key_down(key))
    }

    /// Check if an action was pressed this frame
    pub fn action_pressed(&self, action: Action) -> bool {
        self.keys_for(action).iter().any(|&key| is_key_pressed(key))
    }

    pub fn quit_requested(&self) -> bool {
        is_key_pressed(KeyCode::Escape)
    }

    /// Freeze the current state into a per-tick snapshot.
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            move_left: self.action_down(Action::MoveLeft),
            move_right: self.action_down(Action::MoveRight),
            jump: self.action_pressed(Action::Jump),
            dash: self.action_pressed(Action::Dash),
        }
    }

    fn keys_for(&self, action: Action) -> &'static [KeyCode] {
        match action {
            Action::MoveLeft => &[KeyCode::Left, KeyCode::A],
            Action::MoveRight => &[KeyCode::Right, KeyCode::D],
            Action::Jump => &[KeyCode::X, KeyCode::Space],
            Action::Dash => &[KeyCode::Z, KeyCode::LeftShift],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_from_held_directions() {
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        assert_eq!(left.axis(), -1.0);

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        assert_eq!(right.axis(), 1.0);

        let both = TickInput {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        assert_eq!(both.axis(), 0.0);
    }

    #[test]
    fn test_without_edges_keeps_movement() {
        let input = TickInput {
            move_left: true,
            move_right: false,
            jump: true,
            dash: true,
        };
        let held = input.without_edges();
        assert!(held.move_left);
        assert!(!held.jump);
        assert!(!held.dash);
    }
}
