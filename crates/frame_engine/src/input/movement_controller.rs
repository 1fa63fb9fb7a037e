//! Keyboard-driven viewer movement

use std::f32::consts::TAU;

use super::{Key, KeyInput};
use crate::foundation::math::Vec3;
use crate::scene::GameObject;

/// Fly-camera controller moving an object in the XZ plane
#[derive(Debug, Clone, Copy)]
pub struct KeyboardMovementController {
    /// Translation speed in units per second
    pub move_speed: f32,
    /// Rotation speed in radians per second
    pub look_speed: f32,
}

impl Default for KeyboardMovementController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

impl KeyboardMovementController {
    /// Pitch limit in radians
    pub const MAX_PITCH: f32 = 1.5;

    /// Apply one frame of keyboard movement to `object`.
    ///
    /// Arrow keys rotate (pitch clamped to ±[`Self::MAX_PITCH`], yaw wrapped to
    /// `0..2π`); WASD moves relative to the yaw and E/Q move along the up axis.
    pub fn move_in_plane_xz(&self, input: &impl KeyInput, dt: f32, object: &mut GameObject) {
        let axis = |positive: Key, negative: Key| -> f32 {
            f32::from(u8::from(input.is_pressed(positive))) - f32::from(u8::from(input.is_pressed(negative)))
        };

        let rotate = Vec3::new(
            axis(Key::LookUp, Key::LookDown),
            axis(Key::LookRight, Key::LookLeft),
            0.0,
        );
        if rotate.norm_squared() > f32::EPSILON {
            object.transform.rotation += self.look_speed * dt * rotate.normalize();
        }

        let rotation = &mut object.transform.rotation;
        rotation.x = rotation.x.clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        rotation.y = rotation.y.rem_euclid(TAU);

        let yaw = rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::new(0.0, -1.0, 0.0);

        let move_dir = forward * axis(Key::MoveForward, Key::MoveBackward)
            + right * axis(Key::MoveRight, Key::MoveLeft)
            + up * axis(Key::MoveUp, Key::MoveDown);
        if move_dir.norm_squared() > f32::EPSILON {
            object.transform.translation += self.move_speed * dt * move_dir.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    struct HeldKeys(HashSet<Key>);

    impl HeldKeys {
        fn new(keys: &[Key]) -> Self {
            Self(keys.iter().copied().collect())
        }
    }

    impl KeyInput for HeldKeys {
        fn is_pressed(&self, key: Key) -> bool {
            self.0.contains(&key)
        }
    }

    #[test]
    fn test_forward_follows_yaw() {
        let controller = KeyboardMovementController::default();
        let mut viewer = GameObject::create();
        viewer.transform.rotation.y = std::f32::consts::FRAC_PI_2;

        controller.move_in_plane_xz(&HeldKeys::new(&[Key::MoveForward]), 1.0, &mut viewer);
        assert_relative_eq!(viewer.transform.translation, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_diagonal_move_is_normalized() {
        let controller = KeyboardMovementController::default();
        let mut viewer = GameObject::create();

        controller.move_in_plane_xz(&HeldKeys::new(&[Key::MoveForward, Key::MoveRight]), 0.5, &mut viewer);
        assert_relative_eq!(viewer.transform.translation.norm(), 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let controller = KeyboardMovementController::default();
        let mut viewer = GameObject::create();

        controller.move_in_plane_xz(&HeldKeys::new(&[Key::LookUp]), 10.0, &mut viewer);
        assert_relative_eq!(viewer.transform.rotation.x, KeyboardMovementController::MAX_PITCH);
    }

    #[test]
    fn test_yaw_wraps() {
        let controller = KeyboardMovementController::default();
        let mut viewer = GameObject::create();

        controller.move_in_plane_xz(&HeldKeys::new(&[Key::LookLeft]), 1.0, &mut viewer);
        assert_relative_eq!(viewer.transform.rotation.y, TAU - 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let controller = KeyboardMovementController::default();
        let mut viewer = GameObject::create();

        controller.move_in_plane_xz(&HeldKeys::new(&[Key::MoveUp, Key::MoveDown]), 1.0, &mut viewer);
        assert_eq!(viewer.transform.translation, Vec3::zeros());
    }
}
