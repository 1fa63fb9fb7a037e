//! Per-frame global uniform data
//!
//! Layout matches the `GlobalUbo` block in the shaders (std140).

use crate::foundation::math::Mat4;
use crate::render::Camera;

/// Capacity of the point-light array in [`GlobalUbo`]
pub const MAX_POINT_LIGHTS: usize = 10;

/// Point light data
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointLightData {
    /// Light position (xyz, w ignored)
    pub position: [f32; 4],
    /// Light color (rgb) and intensity (w)
    pub color: [f32; 4],
}

/// Uniform data rebuilt every frame and written into the slot's uniform buffer
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy)]
pub struct GlobalUbo {
    /// Projection matrix (camera to clip space)
    pub projection: [[f32; 4]; 4],
    /// View matrix (world to camera space)
    pub view: [[f32; 4]; 4],
    /// Inverse view matrix; column 3 is the camera position
    pub inverse_view: [[f32; 4]; 4],
    /// Ambient light color (rgb) and intensity (w)
    pub ambient_light_color: [f32; 4],
    /// Point lights; only the first `num_lights` entries are meaningful
    pub point_lights: [PointLightData; MAX_POINT_LIGHTS],
    /// Number of point lights written this frame
    pub num_lights: i32,
    _padding: [i32; 3],
}

unsafe impl bytemuck::Pod for PointLightData {}
unsafe impl bytemuck::Zeroable for PointLightData {}

unsafe impl bytemuck::Pod for GlobalUbo {}
unsafe impl bytemuck::Zeroable for GlobalUbo {}

impl Default for GlobalUbo {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Mat4::identity().into();
        Self {
            projection: identity,
            view: identity,
            inverse_view: identity,
            ambient_light_color: [1.0, 1.0, 1.0, 0.02],
            point_lights: [PointLightData::default(); MAX_POINT_LIGHTS],
            num_lights: 0,
            _padding: [0; 3],
        }
    }
}

impl GlobalUbo {
    /// Copy the camera matrices
    pub fn set_camera(&mut self, camera: &Camera) {
        self.projection = (*camera.projection()).into();
        self.view = (*camera.view()).into();
        self.inverse_view = (*camera.inverse_view()).into();
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_std140_layout() {
        assert_eq!(size_of::<PointLightData>(), 32);
        assert_eq!(offset_of!(GlobalUbo, ambient_light_color), 192);
        assert_eq!(offset_of!(GlobalUbo, point_lights), 208);
        assert_eq!(offset_of!(GlobalUbo, num_lights), 208 + 32 * MAX_POINT_LIGHTS);
        assert_eq!(size_of::<GlobalUbo>() % 16, 0);
    }

    #[test]
    fn test_camera_position_in_inverse_view() {
        let mut camera = Camera::new();
        camera.set_view_direction(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, -1.0, 0.0));

        let mut ubo = GlobalUbo::default();
        ubo.set_camera(&camera);
        assert_eq!(&ubo.inverse_view[3][..3], &[1.0, 2.0, 3.0]);
        assert_eq!(ubo.as_bytes().len(), size_of::<GlobalUbo>());
    }
}
