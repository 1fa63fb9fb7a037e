//! Render systems: per-frame draw dispatch over the scene objects

mod mesh_system;
mod point_light_system;

pub use mesh_system::{MeshPushConstants, MeshRenderSystem};
pub use point_light_system::{PointLightPushConstants, PointLightSystem, DEFAULT_LIGHT_ROTATION_SPEED};
