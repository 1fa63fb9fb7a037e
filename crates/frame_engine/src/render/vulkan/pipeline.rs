//! Shader modules and graphics pipeline creation
//!
//! [`PipelineConfig`] holds every fixed-function state of a pipeline as plain
//! values; the Vulkan create-info structs are assembled from it only inside
//! [`GraphicsPipeline::new`], so a config can be copied and tweaked freely.

use std::ffi::CStr;
use std::fs::File;
use std::path::Path;

use ash::{vk, Device};

use crate::render::vulkan::model;
use crate::render::{RenderError, RenderResult};

/// Pipeline and layout handles a render system binds
pub trait PipelineHandle {
    /// Pipeline handle
    fn handle(&self) -> vk::Pipeline;

    /// Layout used for descriptor sets and push constants
    fn layout(&self) -> vk::PipelineLayout;
}

/// Fixed-function state of a graphics pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Vertex buffer bindings; empty for pipelines that generate vertices
    pub binding_descriptions: Vec<vk::VertexInputBindingDescription>,
    /// Vertex attributes
    pub attribute_descriptions: Vec<vk::VertexInputAttributeDescription>,
    /// Primitive topology
    pub topology: vk::PrimitiveTopology,
    /// Fill mode
    pub polygon_mode: vk::PolygonMode,
    /// Face culling
    pub cull_mode: vk::CullModeFlags,
    /// Winding of front faces
    pub front_face: vk::FrontFace,
    /// Blend state of the single color attachment
    pub color_blend_attachment: vk::PipelineColorBlendAttachmentState,
    /// Depth test enabled
    pub depth_test: bool,
    /// Depth writes enabled
    pub depth_write: bool,
    /// Depth comparison
    pub depth_compare_op: vk::CompareOp,
    /// States set while recording instead of baked into the pipeline
    pub dynamic_states: Vec<vk::DynamicState>,
    /// Subpass index within the render pass
    pub subpass: u32,
}

impl Default for PipelineConfig {
    /// Opaque triangle list over the model vertex layout with depth testing
    /// and dynamic viewport and scissor
    fn default() -> Self {
        Self {
            binding_descriptions: model::binding_descriptions(),
            attribute_descriptions: model::attribute_descriptions(),
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
            color_blend_attachment: vk::PipelineColorBlendAttachmentState {
                blend_enable: vk::FALSE,
                src_color_blend_factor: vk::BlendFactor::ONE,
                dst_color_blend_factor: vk::BlendFactor::ZERO,
                color_blend_op: vk::BlendOp::ADD,
                src_alpha_blend_factor: vk::BlendFactor::ONE,
                dst_alpha_blend_factor: vk::BlendFactor::ZERO,
                alpha_blend_op: vk::BlendOp::ADD,
                color_write_mask: vk::ColorComponentFlags::RGBA,
            },
            depth_test: true,
            depth_write: true,
            depth_compare_op: vk::CompareOp::LESS,
            dynamic_states: vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR],
            subpass: 0,
        }
    }
}

impl PipelineConfig {
    /// Standard alpha blending on the color attachment
    pub fn enable_alpha_blending(mut self) -> Self {
        self.color_blend_attachment.blend_enable = vk::TRUE;
        self.color_blend_attachment.src_color_blend_factor = vk::BlendFactor::SRC_ALPHA;
        self.color_blend_attachment.dst_color_blend_factor = vk::BlendFactor::ONE_MINUS_SRC_ALPHA;
        self.color_blend_attachment.color_blend_op = vk::BlendOp::ADD;
        self.color_blend_attachment.src_alpha_blend_factor = vk::BlendFactor::ONE;
        self.color_blend_attachment.dst_alpha_blend_factor = vk::BlendFactor::ZERO;
        self.color_blend_attachment.alpha_blend_op = vk::BlendOp::ADD;
        self
    }

    /// Drop the vertex layout for pipelines that generate their vertices in the shader
    pub fn without_vertex_input(mut self) -> Self {
        self.binding_descriptions.clear();
        self.attribute_descriptions.clear();
        self
    }
}

/// SPIR-V shader module with RAII cleanup
pub struct ShaderModule {
    device: Device,
    module: vk::ShaderModule,
}

impl ShaderModule {
    /// Create a shader module from SPIR-V words
    pub fn from_words(device: &Device, code: &[u32]) -> RenderResult<Self> {
        let create_info = vk::ShaderModuleCreateInfo::builder().code(code);
        let module = unsafe { device.create_shader_module(&create_info, None)? };
        Ok(Self {
            device: device.clone(),
            module,
        })
    }

    /// Load a SPIR-V file
    pub fn from_file(device: &Device, path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let shader_io = |source| RenderError::ShaderIo {
            path: path.display().to_string(),
            source,
        };

        let mut file = File::open(path).map_err(shader_io)?;
        let code = ash::util::read_spv(&mut file).map_err(shader_io)?;
        log::debug!("Loaded shader {} ({} words)", path.display(), code.len());
        Self::from_words(device, &code)
    }

    /// Get shader module handle
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Pipeline layout with RAII cleanup
pub struct PipelineLayout {
    device: Device,
    layout: vk::PipelineLayout,
}

impl PipelineLayout {
    /// Layout over `set_layouts` with at most one push-constant range
    pub fn new(
        device: &Device,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constant_range: Option<vk::PushConstantRange>,
    ) -> RenderResult<Self> {
        let push_constant_ranges: Vec<_> = push_constant_range.into_iter().collect();
        let create_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(set_layouts)
            .push_constant_ranges(&push_constant_ranges);

        let layout = unsafe { device.create_pipeline_layout(&create_info, None)? };
        Ok(Self {
            device: device.clone(),
            layout,
        })
    }

    /// Get the layout handle
    pub fn handle(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

/// Graphics pipeline wrapper owning its layout
pub struct GraphicsPipeline {
    device: Device,
    pipeline: vk::Pipeline,
    layout: PipelineLayout,
}

impl GraphicsPipeline {
    /// Build a pipeline from a vertex and a fragment shader file
    pub fn new(
        device: &Device,
        vert_path: impl AsRef<Path>,
        frag_path: impl AsRef<Path>,
        config: &PipelineConfig,
        render_pass: vk::RenderPass,
        layout: PipelineLayout,
    ) -> RenderResult<Self> {
        let vert_module = ShaderModule::from_file(device, vert_path)?;
        let frag_module = ShaderModule::from_file(device, frag_path)?;

        let entry_point = CStr::from_bytes_with_nul(b"main\0")
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::builder()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vert_module.handle())
                .name(entry_point)
                .build(),
            vk::PipelineShaderStageCreateInfo::builder()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(frag_module.handle())
                .name(entry_point)
                .build(),
        ];

        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&config.binding_descriptions)
            .vertex_attribute_descriptions(&config.attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(config.topology)
            .primitive_restart_enable(false);

        // Viewport and scissor are dynamic; only the counts matter here
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(config.polygon_mode)
            .line_width(1.0)
            .cull_mode(config.cull_mode)
            .front_face(config.front_face)
            .depth_bias_enable(false);

        let multisample = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let color_blend_attachments = [config.color_blend_attachment];
        let color_blend = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .logic_op(vk::LogicOp::COPY)
            .attachments(&color_blend_attachments);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(config.depth_test)
            .depth_write_enable(config.depth_write)
            .depth_compare_op(config.depth_compare_op)
            .depth_bounds_test_enable(false)
            .min_depth_bounds(0.0)
            .max_depth_bounds(1.0)
            .stencil_test_enable(false);

        let dynamic_state = vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&config.dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .depth_stencil_state(&depth_stencil)
            .dynamic_state(&dynamic_state)
            .layout(layout.handle())
            .render_pass(render_pass)
            .subpass(config.subpass)
            .build();

        let pipelines = unsafe {
            device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, e)| RenderError::Vulkan(e))?
        };

        Ok(Self {
            device: device.clone(),
            pipeline: pipelines[0],
            layout,
        })
    }
}

impl PipelineHandle for GraphicsPipeline {
    fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    fn layout(&self) -> vk::PipelineLayout {
        self.layout.handle()
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_opaque_with_dynamic_viewport() {
        let config = PipelineConfig::default();
        assert_eq!(config.color_blend_attachment.blend_enable, vk::FALSE);
        assert!(config.dynamic_states.contains(&vk::DynamicState::VIEWPORT));
        assert!(config.dynamic_states.contains(&vk::DynamicState::SCISSOR));
        assert_eq!(config.binding_descriptions.len(), 1);
        assert_eq!(config.attribute_descriptions.len(), 4);
    }

    #[test]
    fn test_alpha_blending_and_vertexless_variant() {
        let config = PipelineConfig::default().enable_alpha_blending().without_vertex_input();
        assert_eq!(config.color_blend_attachment.blend_enable, vk::TRUE);
        assert_eq!(
            config.color_blend_attachment.dst_color_blend_factor,
            vk::BlendFactor::ONE_MINUS_SRC_ALPHA
        );
        assert!(config.binding_descriptions.is_empty());
        assert!(config.attribute_descriptions.is_empty());
    }
}
