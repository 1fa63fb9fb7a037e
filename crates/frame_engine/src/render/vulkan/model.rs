//! GPU-resident meshes
//!
//! Vertex input descriptions for [`Vertex`] live here rather than in the scene
//! module so the CPU-side mesh types stay backend-agnostic.

use std::mem::{offset_of, size_of};

use ash::vk;

use crate::render::frame::CommandEncoder;
use crate::render::vulkan::{Buffer, VulkanContext};
use crate::render::{Model, RenderError, RenderResult};
use crate::scene::{MeshData, Vertex};

/// Binding description for interleaved [`Vertex`] data at binding 0
pub fn binding_descriptions() -> Vec<vk::VertexInputBindingDescription> {
    vec![vk::VertexInputBindingDescription {
        binding: 0,
        stride: size_of::<Vertex>() as u32,
        input_rate: vk::VertexInputRate::VERTEX,
    }]
}

/// Attribute descriptions: position, color, normal, uv at locations 0..4
pub fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
    let attribute = |location, format, offset: usize| vk::VertexInputAttributeDescription {
        binding: 0,
        location,
        format,
        offset: offset as u32,
    };

    vec![
        attribute(0, vk::Format::R32G32B32_SFLOAT, offset_of!(Vertex, position)),
        attribute(1, vk::Format::R32G32B32_SFLOAT, offset_of!(Vertex, color)),
        attribute(2, vk::Format::R32G32B32_SFLOAT, offset_of!(Vertex, normal)),
        attribute(3, vk::Format::R32G32_SFLOAT, offset_of!(Vertex, uv)),
    ]
}

/// Mesh uploaded to device-local vertex and index buffers
pub struct VulkanModel {
    vertex_buffer: Buffer,
    vertex_count: u32,
    index_buffer: Option<Buffer>,
    index_count: u32,
}

impl VulkanModel {
    /// Upload `mesh` to the GPU
    pub fn from_mesh_data(context: &VulkanContext, mesh: &MeshData) -> RenderResult<Self> {
        if mesh.vertices.len() < 3 {
            return Err(RenderError::ModelLoad(format!(
                "mesh needs at least 3 vertices, got {}",
                mesh.vertices.len()
            )));
        }

        let vertex_buffer = Buffer::device_local_with_data(
            context,
            bytemuck::cast_slice(&mesh.vertices),
            size_of::<Vertex>() as vk::DeviceSize,
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;

        let index_buffer = if mesh.indices.is_empty() {
            None
        } else {
            Some(Buffer::device_local_with_data(
                context,
                bytemuck::cast_slice(&mesh.indices),
                size_of::<u32>() as vk::DeviceSize,
                vk::BufferUsageFlags::INDEX_BUFFER,
            )?)
        };

        log::debug!(
            "Uploaded mesh: {} vertices, {} indices",
            mesh.vertices.len(),
            mesh.indices.len()
        );

        Ok(Self {
            vertex_buffer,
            vertex_count: mesh.vertices.len() as u32,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }

    /// Load an OBJ file and upload it
    pub fn from_obj(context: &VulkanContext, path: impl AsRef<std::path::Path>) -> RenderResult<Self> {
        Self::from_mesh_data(context, &MeshData::from_obj(path)?)
    }
}

impl Model for VulkanModel {
    fn bind(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer) {
        encoder.bind_vertex_buffers(cmd, &[self.vertex_buffer.handle()], &[0]);
        if let Some(index_buffer) = &self.index_buffer {
            encoder.bind_index_buffer(cmd, index_buffer.handle(), vk::IndexType::UINT32);
        }
    }

    fn draw(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer) {
        if self.index_buffer.is_some() {
            encoder.draw_indexed(cmd, self.index_count, 1, 0, 0, 0);
        } else {
            encoder.draw(cmd, self.vertex_count, 1, 0, 0);
        }
    }
}
