//! CPU-side mesh data: vertices and indices ready for upload

use std::path::Path;

use crate::render::{RenderError, RenderResult};

/// Vertex layout shared by the mesh shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Vertex color
    pub color: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
}

unsafe impl bytemuck::Pod for Vertex {}
unsafe impl bytemuck::Zeroable for Vertex {}

/// Triangle list with optional indices
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle indices; empty for non-indexed meshes
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Load every shape of an OBJ file into one mesh
    pub fn from_obj(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .map_err(|e| RenderError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        let mut mesh_data = Self::default();
        for model in &models {
            let mesh = &model.mesh;
            let base = mesh_data.vertices.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            mesh_data.vertices.reserve(vertex_count);
            for i in 0..vertex_count {
                let color = if mesh.vertex_color.len() >= 3 * (i + 1) {
                    [mesh.vertex_color[3 * i], mesh.vertex_color[3 * i + 1], mesh.vertex_color[3 * i + 2]]
                } else {
                    [1.0, 1.0, 1.0]
                };
                let normal = if mesh.normals.len() >= 3 * (i + 1) {
                    [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
                } else {
                    [0.0, 0.0, 0.0]
                };
                let uv = if mesh.texcoords.len() >= 2 * (i + 1) {
                    [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
                } else {
                    [0.0, 0.0]
                };

                mesh_data.vertices.push(Vertex {
                    position: [mesh.positions[3 * i], mesh.positions[3 * i + 1], mesh.positions[3 * i + 2]],
                    color,
                    normal,
                    uv,
                });
            }
            mesh_data.indices.extend(mesh.indices.iter().map(|&index| base + index));
        }

        if mesh_data.vertices.is_empty() {
            return Err(RenderError::ModelLoad(format!("{}: no vertices", path.display())));
        }

        log::debug!(
            "Loaded {} ({} vertices, {} indices)",
            path.display(),
            mesh_data.vertices.len(),
            mesh_data.indices.len()
        );
        Ok(mesh_data)
    }

    /// Unit quad in the XZ plane facing -Y (up), indexed
    pub fn quad(color: [f32; 3]) -> Self {
        let normal = [0.0, -1.0, 0.0];
        let corners = [[-0.5, 0.0, -0.5], [0.5, 0.0, 0.5], [-0.5, 0.0, 0.5], [0.5, 0.0, -0.5]];
        let uvs = [[0.0, 0.0], [1.0, 1.0], [0.0, 1.0], [1.0, 0.0]];

        let vertices = corners
            .iter()
            .zip(uvs.iter())
            .map(|(&position, &uv)| Vertex {
                position,
                color,
                normal,
                uv,
            })
            .collect();

        Self {
            vertices,
            indices: vec![0, 1, 2, 0, 3, 1],
        }
    }

    /// Cube of edge length 1 centered at the origin, one color per face
    pub fn cube() -> Self {
        // (normal, color, four corners in winding order)
        let faces: [([f32; 3], [f32; 3], [[f32; 3]; 4]); 6] = [
            ([-1.0, 0.0, 0.0], [0.9, 0.9, 0.9], [[-0.5, -0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, -0.5]]),
            ([1.0, 0.0, 0.0], [0.8, 0.8, 0.1], [[0.5, -0.5, -0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, -0.5]]),
            ([0.0, -1.0, 0.0], [0.9, 0.6, 0.1], [[-0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5], [0.5, -0.5, -0.5]]),
            ([0.0, 1.0, 0.0], [0.8, 0.1, 0.1], [[-0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, -0.5]]),
            ([0.0, 0.0, 1.0], [0.1, 0.1, 0.8], [[-0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, -0.5, 0.5]]),
            ([0.0, 0.0, -1.0], [0.1, 0.8, 0.1], [[-0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, -0.5, -0.5]]),
        ];

        let mut mesh_data = Self::default();
        for (normal, color, corners) in faces {
            let base = mesh_data.vertices.len() as u32;
            mesh_data.vertices.extend(corners.iter().map(|&position| Vertex {
                position,
                color,
                normal,
                uv: [0.0, 0.0],
            }));
            mesh_data
                .indices
                .extend([base, base + 1, base + 2, base, base + 3, base + 1]);
        }
        mesh_data
    }

    /// Load an OBJ file, falling back to `fallback` when it cannot be read
    pub fn from_obj_or(path: impl AsRef<Path>, fallback: impl FnOnce() -> Self) -> Self {
        match Self::from_obj(path.as_ref()) {
            Ok(mesh_data) => mesh_data,
            Err(e) => {
                log::warn!("{}, using built-in mesh", e);
                fallback()
            }
        }
    }
}
