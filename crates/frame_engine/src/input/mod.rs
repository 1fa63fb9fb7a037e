//! Keyboard input and camera movement

mod movement_controller;

pub use movement_controller::KeyboardMovementController;

/// Logical keys the movement controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Strafe left
    MoveLeft,
    /// Strafe right
    MoveRight,
    /// Move forward
    MoveForward,
    /// Move backward
    MoveBackward,
    /// Move up
    MoveUp,
    /// Move down
    MoveDown,
    /// Turn left
    LookLeft,
    /// Turn right
    LookRight,
    /// Look up
    LookUp,
    /// Look down
    LookDown,
}

/// Source of key state
pub trait KeyInput {
    /// Whether `key` is currently held down
    fn is_pressed(&self, key: Key) -> bool;
}
