//! Command recording seam
//!
//! Everything that records into a command buffer goes through
//! [`CommandEncoder`], so the frame protocol and the draw dispatchers can be
//! driven by a real `ash::Device` or by a recorder in tests.

use ash::vk;

/// Records draw-time commands into a command buffer.
///
/// Implementations assume `cmd` is in the recording state; that is the
/// caller's responsibility, as with the raw Vulkan calls.
pub trait CommandEncoder {
    /// Bind a graphics pipeline
    fn bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline);

    /// Bind descriptor sets for the graphics bind point
    fn bind_descriptor_sets(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    );

    /// Push a block of constants at offset 0
    fn push_constants(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        bytes: &[u8],
    );

    /// Bind vertex buffers starting at binding 0
    fn bind_vertex_buffers(&self, cmd: vk::CommandBuffer, buffers: &[vk::Buffer], offsets: &[vk::DeviceSize]);

    /// Bind an index buffer at offset 0
    fn bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer, index_type: vk::IndexType);

    /// Non-indexed draw
    fn draw(&self, cmd: vk::CommandBuffer, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    /// Indexed draw
    fn draw_indexed(
        &self,
        cmd: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );

    /// Begin a render pass with inline subpass contents
    fn begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: vk::Rect2D,
        clear_values: &[vk::ClearValue],
    );

    /// Set dynamic viewport 0
    fn set_viewport(&self, cmd: vk::CommandBuffer, viewport: vk::Viewport);

    /// Set dynamic scissor 0
    fn set_scissor(&self, cmd: vk::CommandBuffer, scissor: vk::Rect2D);

    /// End the current render pass
    fn end_render_pass(&self, cmd: vk::CommandBuffer);
}
