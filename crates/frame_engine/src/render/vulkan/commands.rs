//! Command pool management and raw command recording

use ash::{vk, Device};

use crate::render::frame::CommandEncoder;
use crate::render::RenderResult;

/// Command pool wrapper with RAII cleanup
pub struct CommandPool {
    device: Device,
    command_pool: vk::CommandPool,
}

impl CommandPool {
    /// Create a pool whose buffers can be reset individually
    pub fn new(device: Device, queue_family_index: u32) -> RenderResult<Self> {
        let pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER | vk::CommandPoolCreateFlags::TRANSIENT)
            .queue_family_index(queue_family_index);

        let command_pool = unsafe { device.create_command_pool(&pool_create_info, None)? };

        Ok(Self { device, command_pool })
    }

    /// Allocate primary command buffers
    pub fn allocate_command_buffers(&self, count: u32) -> RenderResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        Ok(unsafe { self.device.allocate_command_buffers(&alloc_info)? })
    }

    /// Return command buffers to the pool
    pub fn free_command_buffers(&self, command_buffers: &[vk::CommandBuffer]) {
        if command_buffers.is_empty() {
            return;
        }
        unsafe {
            self.device.free_command_buffers(self.command_pool, command_buffers);
        }
    }

    /// Record commands into a temporary buffer, submit them to `queue` and
    /// wait for completion
    pub fn submit_single_time<F>(&self, queue: vk::Queue, record: F) -> RenderResult<()>
    where
        F: FnOnce(&Device, vk::CommandBuffer),
    {
        let command_buffers = self.allocate_command_buffers(1)?;
        let command_buffer = command_buffers[0];

        let result = (|| -> RenderResult<()> {
            let begin_info =
                vk::CommandBufferBeginInfo::builder().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            unsafe { self.device.begin_command_buffer(command_buffer, &begin_info)? };

            record(&self.device, command_buffer);

            unsafe {
                self.device.end_command_buffer(command_buffer)?;
                let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers).build();
                self.device.queue_submit(queue, &[submit_info], vk::Fence::null())?;
                self.device.queue_wait_idle(queue)?;
            }
            Ok(())
        })();

        self.free_command_buffers(&command_buffers);
        result
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}

impl CommandEncoder for Device {
    fn bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe { self.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pipeline) }
    }

    fn bind_descriptor_sets(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) {
        unsafe { self.cmd_bind_descriptor_sets(cmd, vk::PipelineBindPoint::GRAPHICS, layout, first_set, sets, &[]) }
    }

    fn push_constants(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        bytes: &[u8],
    ) {
        unsafe { self.cmd_push_constants(cmd, layout, stages, 0, bytes) }
    }

    fn bind_vertex_buffers(&self, cmd: vk::CommandBuffer, buffers: &[vk::Buffer], offsets: &[vk::DeviceSize]) {
        unsafe { self.cmd_bind_vertex_buffers(cmd, 0, buffers, offsets) }
    }

    fn bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer, index_type: vk::IndexType) {
        unsafe { self.cmd_bind_index_buffer(cmd, buffer, 0, index_type) }
    }

    fn draw(&self, cmd: vk::CommandBuffer, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        unsafe { self.cmd_draw(cmd, vertex_count, instance_count, first_vertex, first_instance) }
    }

    fn draw_indexed(
        &self,
        cmd: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        unsafe { self.cmd_draw_indexed(cmd, index_count, instance_count, first_index, vertex_offset, first_instance) }
    }

    fn begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: vk::Rect2D,
        clear_values: &[vk::ClearValue],
    ) {
        let begin_info = vk::RenderPassBeginInfo::builder()
            .render_pass(render_pass)
            .framebuffer(framebuffer)
            .render_area(render_area)
            .clear_values(clear_values);

        unsafe { self.cmd_begin_render_pass(cmd, &begin_info, vk::SubpassContents::INLINE) }
    }

    fn set_viewport(&self, cmd: vk::CommandBuffer, viewport: vk::Viewport) {
        unsafe { self.cmd_set_viewport(cmd, 0, &[viewport]) }
    }

    fn set_scissor(&self, cmd: vk::CommandBuffer, scissor: vk::Rect2D) {
        unsafe { self.cmd_set_scissor(cmd, 0, &[scissor]) }
    }

    fn end_render_pass(&self, cmd: vk::CommandBuffer) {
        unsafe { self.cmd_end_render_pass(cmd) }
    }
}
