//! Opaque mesh pass

use std::mem::size_of;
use std::path::Path;

use ash::{vk, Device};

use crate::foundation::math::mat3_to_padded_columns;
use crate::render::frame::FrameContext;
use crate::render::vulkan::{GraphicsPipeline, PipelineConfig, PipelineHandle, PipelineLayout};
use crate::render::RenderResult;

const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags =
    vk::ShaderStageFlags::from_raw(vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw());

/// Per-object push data of the mesh pass
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPushConstants {
    /// World transform
    pub model_matrix: [[f32; 4]; 4],
    /// Inverse-transpose of the upper 3x3 of the world transform, padded to a mat4
    pub normal_matrix: [[f32; 4]; 4],
}

unsafe impl bytemuck::Pod for MeshPushConstants {}
unsafe impl bytemuck::Zeroable for MeshPushConstants {}

/// Draws every scene object that has a mesh with one shared pipeline
pub struct MeshRenderSystem<P: PipelineHandle = GraphicsPipeline> {
    pipeline: P,
}

impl MeshRenderSystem<GraphicsPipeline> {
    /// Build the `simple_shader` pipeline for `render_pass`
    pub fn new(
        device: &Device,
        render_pass: vk::RenderPass,
        global_set_layout: vk::DescriptorSetLayout,
        shader_dir: impl AsRef<Path>,
    ) -> RenderResult<Self> {
        let push_constant_range = vk::PushConstantRange {
            stage_flags: PUSH_CONSTANT_STAGES,
            offset: 0,
            size: size_of::<MeshPushConstants>() as u32,
        };
        let layout = PipelineLayout::new(device, &[global_set_layout], Some(push_constant_range))?;

        let shader_dir = shader_dir.as_ref();
        let pipeline = GraphicsPipeline::new(
            device,
            shader_dir.join("simple_shader.vert.spv"),
            shader_dir.join("simple_shader.frag.spv"),
            &PipelineConfig::default(),
            render_pass,
            layout,
        )?;

        log::debug!("Mesh render system ready");
        Ok(Self::from_pipeline(pipeline))
    }
}

impl<P: PipelineHandle> MeshRenderSystem<P> {
    /// Use an existing pipeline whose layout takes [`MeshPushConstants`]
    pub fn from_pipeline(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Record one draw per object that has a mesh; objects without one are skipped.
    ///
    /// The pipeline and the frame's descriptor set are bound once for the whole pass.
    pub fn render_game_objects(&self, frame: &FrameContext) {
        let encoder = frame.encoder;
        let cmd = frame.command_buffer;

        encoder.bind_pipeline(cmd, self.pipeline.handle());
        encoder.bind_descriptor_sets(cmd, self.pipeline.layout(), 0, &[frame.global_descriptor_set]);

        for object in frame.game_objects.values() {
            let Some(model) = &object.model else {
                continue;
            };

            let push = MeshPushConstants {
                model_matrix: object.transform.mat4().into(),
                normal_matrix: mat3_to_padded_columns(&object.transform.normal_matrix()),
            };
            encoder.push_constants(cmd, self.pipeline.layout(), PUSH_CONSTANT_STAGES, bytemuck::bytes_of(&push));

            model.bind(encoder, cmd);
            model.draw(encoder, cmd);
        }
    }
}
