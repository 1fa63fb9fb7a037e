//! # 3D Camera
//!
//! Projection and view matrices in Vulkan clip-space conventions: depth in
//! `0..1` and the Y axis pointing down in normalized device coordinates.
//!
//! ## Coordinate System
//! The world is left-handed with -Y up, matching the shaders:
//! - X+ = Right
//! - Y- = Up
//! - Z+ = Forward (into the screen)

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Camera holding a projection, a view and the inverse view
#[derive(Debug, Clone)]
pub struct Camera {
    projection_matrix: Mat4,
    view_matrix: Mat4,
    inverse_view_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection_matrix: Mat4::identity(),
            view_matrix: Mat4::identity(),
            inverse_view_matrix: Mat4::identity(),
        }
    }
}

impl Camera {
    /// Create a camera with identity matrices
    pub fn new() -> Self {
        Self::default()
    }

    /// Orthographic projection of the box `left..right`, `top..bottom`, `near..far`
    pub fn set_orthographic_projection(&mut self, left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) {
        let mut projection = Mat4::identity();
        projection[(0, 0)] = 2.0 / (right - left);
        projection[(1, 1)] = 2.0 / (bottom - top);
        projection[(2, 2)] = 1.0 / (far - near);
        projection[(0, 3)] = -(right + left) / (right - left);
        projection[(1, 3)] = -(bottom + top) / (bottom - top);
        projection[(2, 3)] = -near / (far - near);
        self.projection_matrix = projection;
    }

    /// Perspective projection with vertical field of view `fovy` in radians
    ///
    /// # Panics
    /// In debug builds, if `aspect` is zero.
    pub fn set_perspective_projection(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        debug_assert!(aspect.abs() > f32::EPSILON, "aspect ratio must be non-zero");

        let tan_half_fovy = (fovy / 2.0).tan();
        let mut projection = Mat4::zeros();
        projection[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        projection[(1, 1)] = 1.0 / tan_half_fovy;
        projection[(2, 2)] = far / (far - near);
        projection[(3, 2)] = 1.0;
        projection[(2, 3)] = -(far * near) / (far - near);
        self.projection_matrix = projection;
    }

    /// Look from `position` along `direction`
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        let w = direction.normalize();
        let u = w.cross(&up).normalize();
        let v = w.cross(&u);
        self.set_view_basis(position, u, v, w);
    }

    /// Look from `position` at `target`
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// Orient the camera with Tait-Bryan angles applied in Y, X, Z order
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let (s3, c3) = rotation.z.sin_cos();
        let (s2, c2) = rotation.x.sin_cos();
        let (s1, c1) = rotation.y.sin_cos();

        let u = Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1);
        let v = Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3);
        let w = Vec3::new(c2 * s1, -s2, c1 * c2);
        self.set_view_basis(position, u, v, w);
    }

    /// Build the view from an orthonormal camera basis. Rows of the view
    /// rotation are the basis vectors; columns of the inverse are the basis
    /// vectors followed by the position.
    fn set_view_basis(&mut self, position: Vec3, u: Vec3, v: Vec3, w: Vec3) {
        let mut view = Mat4::identity();
        let mut inverse = Mat4::identity();
        for (row, axis) in [u, v, w].iter().enumerate() {
            for col in 0..3 {
                view[(row, col)] = axis[col];
                inverse[(col, row)] = axis[col];
            }
            view[(row, 3)] = -axis.dot(&position);
            inverse[(row, 3)] = position[row];
        }
        self.view_matrix = view;
        self.inverse_view_matrix = inverse;
    }

    /// Projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// World-to-camera matrix
    pub fn view(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Camera-to-world matrix
    pub fn inverse_view(&self) -> &Mat4 {
        &self.inverse_view_matrix
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec3 {
        let column: Vec4 = self.inverse_view_matrix.column(3).into_owned();
        column.xyz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_moves_camera_to_origin() {
        let mut camera = Camera::new();
        let position = Vec3::new(1.0, -2.0, -3.0);
        camera.set_view_target(position, Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0));

        let in_view = camera.view() * position.push(1.0);
        assert_relative_eq!(in_view, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(camera.position(), position, epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_view_inverts_view() {
        let mut camera = Camera::new();
        camera.set_view_yxz(Vec3::new(0.5, -1.0, -2.5), Vec3::new(0.3, -0.7, 0.1));

        let product = camera.view() * camera.inverse_view();
        assert_relative_eq!(product, Mat4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_target_ends_up_on_forward_axis() {
        let mut camera = Camera::new();
        let target = Vec3::new(0.0, 0.0, 4.0);
        camera.set_view_target(Vec3::new(0.0, 0.0, -1.0), target, Vec3::new(0.0, -1.0, 0.0));

        let in_view = camera.view() * target.push(1.0);
        assert_relative_eq!(in_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(in_view.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(in_view.z, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_perspective_maps_clip_planes_to_unit_depth() {
        let mut camera = Camera::new();
        camera.set_perspective_projection(50f32.to_radians(), 1.5, 0.1, 100.0);

        let near = camera.projection() * Vec4::new(0.0, 0.0, 0.1, 1.0);
        let far = camera.projection() * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_maps_box_to_clip_volume() {
        let mut camera = Camera::new();
        camera.set_orthographic_projection(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);

        let corner = camera.projection() * Vec4::new(2.0, 1.0, 10.0, 1.0);
        assert_relative_eq!(corner, Vec4::new(1.0, 1.0, 1.0, 1.0), epsilon = 1e-5);
        let opposite = camera.projection() * Vec4::new(-2.0, -1.0, 0.0, 1.0);
        assert_relative_eq!(opposite, Vec4::new(-1.0, -1.0, 0.0, 1.0), epsilon = 1e-5);
    }
}
