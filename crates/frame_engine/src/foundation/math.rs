//! Math utilities and types
//!
//! Provides the fundamental math types used by the renderer and the scene.

pub use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Transform of a scene object: translation, per-axis scale and Tait-Bryan rotation.
///
/// Rotation angles are in radians and applied in Y (yaw), X (pitch), Z (roll)
/// order, so the model matrix is `T * Ry * Rx * Rz * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub translation: Vec3,

    /// Scale factors per axis
    pub scale: Vec3,

    /// Rotation angles (x = pitch, y = yaw, z = roll)
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Create a transform with only a translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Rotation part of the transform (`Ry * Rx * Rz`)
    pub fn rotation_matrix(&self) -> Mat3 {
        let yaw = Rotation3::from_axis_angle(&Vec3::y_axis(), self.rotation.y);
        let pitch = Rotation3::from_axis_angle(&Vec3::x_axis(), self.rotation.x);
        let roll = Rotation3::from_axis_angle(&Vec3::z_axis(), self.rotation.z);
        (yaw * pitch * roll).into_inner()
    }

    /// Upper 3x3 linear part of the model matrix (rotation * scale)
    pub fn linear(&self) -> Mat3 {
        self.rotation_matrix() * Mat3::from_diagonal(&self.scale)
    }

    /// Model (world) matrix
    pub fn mat4(&self) -> Mat4 {
        let mut matrix = self.linear().to_homogeneous();
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        matrix
    }

    /// Normal matrix: inverse-transpose of the linear part.
    ///
    /// Non-uniform scale makes this differ from the linear part itself. A
    /// degenerate (zero) scale has no inverse and falls back to the rotation.
    pub fn normal_matrix(&self) -> Mat3 {
        match self.linear().try_inverse() {
            Some(inverse) => inverse.transpose(),
            None => {
                log::warn!("Transform scale {:?} is not invertible, using rotation for normals", self.scale);
                self.rotation_matrix()
            }
        }
    }
}

/// Rotate a point around an axis through the origin.
///
/// The axis does not need to be normalized. Positive angles follow the
/// right-hand rule around the given axis.
pub fn rotate_about_axis(point: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
    rotation * point
}

/// Expand a 3x3 matrix into a 4x4 column array with the last row/column zeroed
/// except for `[3][3] = 1`, the std140 layout used by `mat4` push constants.
pub fn mat3_to_padded_columns(matrix: &Mat3) -> [[f32; 4]; 4] {
    matrix.to_homogeneous().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform_matrix() {
        let transform = Transform::default();
        assert_relative_eq!(transform.mat4(), Mat4::identity());
        assert_relative_eq!(transform.normal_matrix(), Mat3::identity());
    }

    #[test]
    fn test_translation_lands_in_last_column() {
        let transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let matrix = transform.mat4();
        assert_relative_eq!(matrix[(0, 3)], 1.0);
        assert_relative_eq!(matrix[(1, 3)], 2.0);
        assert_relative_eq!(matrix[(2, 3)], 3.0);
        assert_relative_eq!(matrix[(3, 3)], 1.0);
    }

    #[test]
    fn test_normal_matrix_is_inverse_transpose_for_non_uniform_scale() {
        let transform = Transform {
            scale: Vec3::new(2.0, 1.0, 0.5),
            ..Default::default()
        };

        let normal = transform.normal_matrix();
        let expected = Mat3::from_diagonal(&Vec3::new(0.5, 1.0, 2.0));
        assert_relative_eq!(normal, expected, epsilon = 1e-6);
        // Not the linear part itself
        assert!((normal - transform.linear()).abs().max() > 1.0);
    }

    #[test]
    fn test_normal_matrix_with_rotation_and_scale() {
        let transform = Transform {
            scale: Vec3::new(3.0, 1.5, 3.0),
            rotation: Vec3::new(0.3, 1.1, -0.4),
            ..Default::default()
        };
        let linear = transform.linear();
        let expected = linear.try_inverse().unwrap().transpose();
        assert_relative_eq!(transform.normal_matrix(), expected, epsilon = 1e-5);
        // N^T * M == I for the inverse-transpose
        assert_relative_eq!(transform.normal_matrix().transpose() * linear, Mat3::identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_yaw_rotation_order() {
        let transform = Transform {
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            ..Default::default()
        };
        let rotated = transform.mat4().transform_vector(&Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(rotated, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotate_about_negative_y() {
        let rotated = rotate_about_axis(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0), FRAC_PI_2);
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_padded_columns_layout() {
        let columns = mat3_to_padded_columns(&Mat3::from_diagonal(&Vec3::new(0.5, 1.0, 2.0)));
        assert_eq!(columns[0], [0.5, 0.0, 0.0, 0.0]);
        assert_eq!(columns[2], [0.0, 0.0, 2.0, 0.0]);
        assert_eq!(columns[3], [0.0, 0.0, 0.0, 1.0]);
    }
}
