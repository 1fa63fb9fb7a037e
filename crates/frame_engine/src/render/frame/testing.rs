//! In-memory stand-ins for the GPU side of the frame protocol

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ash::vk::{self, Handle};

use crate::render::frame::{
    AcquireOutcome, CommandEncoder, PresentOutcome, RenderDevice, SwapchainFormats, SwapchainTarget,
    MAX_FRAMES_IN_FLIGHT,
};
use crate::render::model::Model;
use crate::render::vulkan::PipelineHandle;
use crate::render::window::WindowSurface;
use crate::render::RenderResult;

/// One command captured by [`RecordingEncoder`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    BindPipeline {
        cmd: vk::CommandBuffer,
        pipeline: vk::Pipeline,
    },
    BindDescriptorSets {
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: Vec<vk::DescriptorSet>,
    },
    PushConstants {
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        bytes: Vec<u8>,
    },
    BindVertexBuffers {
        cmd: vk::CommandBuffer,
        buffers: Vec<vk::Buffer>,
    },
    BindIndexBuffer {
        cmd: vk::CommandBuffer,
        buffer: vk::Buffer,
    },
    Draw {
        cmd: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
    },
    DrawIndexed {
        cmd: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
    },
    BeginRenderPass {
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: (i32, i32, u32, u32),
        clear_color: [f32; 4],
        clear_depth: f32,
        clear_stencil: u32,
    },
    SetViewport {
        cmd: vk::CommandBuffer,
        viewport: [f32; 6],
    },
    SetScissor {
        cmd: vk::CommandBuffer,
        scissor: (i32, i32, u32, u32),
    },
    EndRenderPass {
        cmd: vk::CommandBuffer,
    },
}

fn rect_tuple(rect: vk::Rect2D) -> (i32, i32, u32, u32) {
    (rect.offset.x, rect.offset.y, rect.extent.width, rect.extent.height)
}

/// Encoder that stores every command instead of recording it
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    commands: RefCell<Vec<RecordedCommand>>,
}

impl RecordingEncoder {
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.borrow().clone()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }

    /// Payloads of all push-constant commands in recording order
    pub fn push_constant_payloads(&self) -> Vec<Vec<u8>> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                RecordedCommand::PushConstants { bytes, .. } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&RecordedCommand) -> bool) -> usize {
        self.commands.borrow().iter().filter(|command| predicate(command)).count()
    }

    fn push(&self, command: RecordedCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl CommandEncoder for RecordingEncoder {
    fn bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.push(RecordedCommand::BindPipeline { cmd, pipeline });
    }

    fn bind_descriptor_sets(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) {
        self.push(RecordedCommand::BindDescriptorSets {
            cmd,
            layout,
            first_set,
            sets: sets.to_vec(),
        });
    }

    fn push_constants(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        bytes: &[u8],
    ) {
        self.push(RecordedCommand::PushConstants {
            cmd,
            layout,
            stages,
            bytes: bytes.to_vec(),
        });
    }

    fn bind_vertex_buffers(&self, cmd: vk::CommandBuffer, buffers: &[vk::Buffer], _offsets: &[vk::DeviceSize]) {
        self.push(RecordedCommand::BindVertexBuffers {
            cmd,
            buffers: buffers.to_vec(),
        });
    }

    fn bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer, _index_type: vk::IndexType) {
        self.push(RecordedCommand::BindIndexBuffer { cmd, buffer });
    }

    fn draw(&self, cmd: vk::CommandBuffer, vertex_count: u32, instance_count: u32, _first_vertex: u32, _first_instance: u32) {
        self.push(RecordedCommand::Draw {
            cmd,
            vertex_count,
            instance_count,
        });
    }

    fn draw_indexed(
        &self,
        cmd: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
        self.push(RecordedCommand::DrawIndexed {
            cmd,
            index_count,
            instance_count,
        });
    }

    fn begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: vk::Rect2D,
        clear_values: &[vk::ClearValue],
    ) {
        // SAFETY: the pass recorder always writes the color value first and the depth value second
        let (clear_color, depth_stencil) = unsafe { (clear_values[0].color.float32, clear_values[1].depth_stencil) };
        self.push(RecordedCommand::BeginRenderPass {
            cmd,
            render_pass,
            framebuffer,
            render_area: rect_tuple(render_area),
            clear_color,
            clear_depth: depth_stencil.depth,
            clear_stencil: depth_stencil.stencil,
        });
    }

    fn set_viewport(&self, cmd: vk::CommandBuffer, viewport: vk::Viewport) {
        self.push(RecordedCommand::SetViewport {
            cmd,
            viewport: [
                viewport.x,
                viewport.y,
                viewport.width,
                viewport.height,
                viewport.min_depth,
                viewport.max_depth,
            ],
        });
    }

    fn set_scissor(&self, cmd: vk::CommandBuffer, scissor: vk::Rect2D) {
        self.push(RecordedCommand::SetScissor {
            cmd,
            scissor: rect_tuple(scissor),
        });
    }

    fn end_render_pass(&self, cmd: vk::CommandBuffer) {
        self.push(RecordedCommand::EndRenderPass { cmd });
    }
}

/// Device-side events in the order the frame synchronizer caused them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    AllocateCommandBuffers(u32),
    FreeCommandBuffers(usize),
    WaitIdle,
    CreateSwapchain {
        generation: usize,
        width: u32,
        height: u32,
        had_previous: bool,
    },
    DropSwapchain(usize),
    FenceWait(usize),
    Acquire {
        frame_index: usize,
    },
    BeginCommandBuffer(vk::CommandBuffer),
    EndCommandBuffer(vk::CommandBuffer),
    Submit {
        cmd: vk::CommandBuffer,
        image_index: u32,
        frame_index: usize,
    },
}

/// Shared state behind [`ScriptedDevice`] and its swapchains
#[derive(Debug)]
pub struct DeviceState {
    /// Outcomes returned by successive acquires; `Ready` on the next image once exhausted
    pub acquire_script: VecDeque<RenderResult<AcquireOutcome>>,
    /// Outcomes returned by successive presents; `Presented` once exhausted
    pub present_script: VecDeque<PresentOutcome>,
    /// Formats given to the next created swapchain
    pub next_formats: SwapchainFormats,
    pub image_count: usize,
    pub events: Vec<DeviceEvent>,
    /// Per-slot fence state: `true` while submitted work is pending
    pub in_flight: [bool; MAX_FRAMES_IN_FLIGHT],
    /// Set when a command buffer was begun while its slot was still in flight
    pub reused_busy_slot: bool,
    generations: usize,
    next_image: u32,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            next_formats: SwapchainFormats {
                color: vk::Format::B8G8R8A8_SRGB,
                depth: vk::Format::D32_SFLOAT,
            },
            image_count: 3,
            events: Vec::new(),
            in_flight: [false; MAX_FRAMES_IN_FLIGHT],
            reused_busy_slot: false,
            generations: 0,
            next_image: 0,
        }
    }
}

impl DeviceState {
    pub fn swapchains_created(&self) -> usize {
        self.generations
    }

    pub fn acquired_frames(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::Acquire { frame_index } => Some(*frame_index),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self) -> Vec<(vk::CommandBuffer, u32, usize)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::Submit {
                    cmd,
                    image_index,
                    frame_index,
                } => Some((*cmd, *image_index, *frame_index)),
                _ => None,
            })
            .collect()
    }
}

/// Device whose swapchain behaviour is driven by a script
#[derive(Default)]
pub struct ScriptedDevice {
    pub state: Rc<RefCell<DeviceState>>,
    pub encoder: RecordingEncoder,
    /// Slot owning each allocated command buffer
    command_buffers: RefCell<Vec<vk::CommandBuffer>>,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_acquire_script(self, script: impl IntoIterator<Item = AcquireOutcome>) -> Self {
        self.state.borrow_mut().acquire_script = script.into_iter().map(Ok).collect();
        self
    }

    pub fn with_present_script(self, script: impl IntoIterator<Item = PresentOutcome>) -> Self {
        self.state.borrow_mut().present_script = script.into_iter().collect();
        self
    }

    fn slot_of(&self, cmd: vk::CommandBuffer) -> Option<usize> {
        self.command_buffers.borrow().iter().position(|&buffer| buffer == cmd)
    }
}

impl RenderDevice for ScriptedDevice {
    type Swapchain = ScriptedSwapchain;

    fn create_swapchain(
        &self,
        extent: vk::Extent2D,
        previous: Option<&ScriptedSwapchain>,
    ) -> RenderResult<ScriptedSwapchain> {
        let mut state = self.state.borrow_mut();
        state.generations += 1;
        let generation = state.generations;
        state.events.push(DeviceEvent::CreateSwapchain {
            generation,
            width: extent.width,
            height: extent.height,
            had_previous: previous.is_some(),
        });

        Ok(ScriptedSwapchain {
            generation,
            extent,
            formats: state.next_formats,
            image_count: state.image_count,
            state: Rc::clone(&self.state),
        })
    }

    fn allocate_command_buffers(&self, count: u32) -> RenderResult<Vec<vk::CommandBuffer>> {
        self.state.borrow_mut().events.push(DeviceEvent::AllocateCommandBuffers(count));
        let buffers: Vec<_> = (0..u64::from(count))
            .map(|i| vk::CommandBuffer::from_raw(100 + i))
            .collect();
        *self.command_buffers.borrow_mut() = buffers.clone();
        Ok(buffers)
    }

    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]) {
        self.state.borrow_mut().events.push(DeviceEvent::FreeCommandBuffers(buffers.len()));
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> RenderResult<()> {
        let slot = self.slot_of(cmd);
        let mut state = self.state.borrow_mut();
        if slot.map_or(false, |slot| state.in_flight[slot]) {
            state.reused_busy_slot = true;
        }
        state.events.push(DeviceEvent::BeginCommandBuffer(cmd));
        Ok(())
    }

    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> RenderResult<()> {
        self.state.borrow_mut().events.push(DeviceEvent::EndCommandBuffer(cmd));
        Ok(())
    }

    fn wait_idle(&self) -> RenderResult<()> {
        let mut state = self.state.borrow_mut();
        state.in_flight = [false; MAX_FRAMES_IN_FLIGHT];
        state.events.push(DeviceEvent::WaitIdle);
        Ok(())
    }

    fn encoder(&self) -> &dyn CommandEncoder {
        &self.encoder
    }
}

/// Swapchain handed out by [`ScriptedDevice`]
#[derive(Debug)]
pub struct ScriptedSwapchain {
    pub generation: usize,
    extent: vk::Extent2D,
    formats: SwapchainFormats,
    image_count: usize,
    state: Rc<RefCell<DeviceState>>,
}

impl SwapchainTarget for ScriptedSwapchain {
    fn acquire_next_image(&mut self, frame_index: usize) -> RenderResult<AcquireOutcome> {
        let mut state = self.state.borrow_mut();
        state.in_flight[frame_index] = false;
        state.events.push(DeviceEvent::FenceWait(frame_index));
        state.events.push(DeviceEvent::Acquire { frame_index });

        match state.acquire_script.pop_front() {
            Some(outcome) => outcome,
            None => {
                let image_index = state.next_image;
                state.next_image = (image_index + 1) % self.image_count as u32;
                Ok(AcquireOutcome::Ready {
                    image_index,
                    suboptimal: false,
                })
            }
        }
    }

    fn submit_command_buffer(
        &mut self,
        cmd: vk::CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> RenderResult<PresentOutcome> {
        let mut state = self.state.borrow_mut();
        state.in_flight[frame_index] = true;
        state.events.push(DeviceEvent::Submit {
            cmd,
            image_index,
            frame_index,
        });
        Ok(state.present_script.pop_front().unwrap_or(PresentOutcome::Presented))
    }

    fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn render_pass(&self) -> vk::RenderPass {
        vk::RenderPass::from_raw(1_000 + self.generation as u64)
    }

    fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        vk::Framebuffer::from_raw(10_000 * self.generation as u64 + u64::from(image_index))
    }

    fn image_count(&self) -> usize {
        self.image_count
    }

    fn formats(&self) -> SwapchainFormats {
        self.formats
    }
}

impl Drop for ScriptedSwapchain {
    fn drop(&mut self) {
        self.state.borrow_mut().events.push(DeviceEvent::DropSwapchain(self.generation));
    }
}

/// Window whose drawable size follows a script
#[derive(Debug)]
pub struct ScriptedWindow {
    extent: vk::Extent2D,
    /// Extents adopted one by one on each `wait_events`
    pub pending_extents: VecDeque<vk::Extent2D>,
    pub resized: bool,
    pub wait_count: usize,
}

impl ScriptedWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: vk::Extent2D { width, height },
            pending_extents: VecDeque::new(),
            resized: false,
            wait_count: 0,
        }
    }

    /// Change the drawable size and raise the resize flag, as a framebuffer-size callback would
    pub fn resize(&mut self, width: u32, height: u32) {
        self.extent = vk::Extent2D { width, height };
        self.resized = true;
    }
}

impl WindowSurface for ScriptedWindow {
    fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn was_resized(&self) -> bool {
        self.resized
    }

    fn reset_resized_flag(&mut self) {
        self.resized = false;
    }

    fn wait_events(&mut self) {
        self.wait_count += 1;
        if let Some(extent) = self.pending_extents.pop_front() {
            self.extent = extent;
        }
    }
}

/// Mesh that records a bind and an indexed draw tagged with its id
#[derive(Debug)]
pub struct RecordingModel {
    pub id: u32,
}

impl RecordingModel {
    /// Vertex buffer handle the model binds
    pub fn buffer(&self) -> vk::Buffer {
        vk::Buffer::from_raw(u64::from(self.id))
    }
}

impl Model for RecordingModel {
    fn bind(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer) {
        encoder.bind_vertex_buffers(cmd, &[self.buffer()], &[0]);
    }

    fn draw(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer) {
        encoder.draw_indexed(cmd, self.id, 1, 0, 0, 0);
    }
}

/// Pipeline with fixed fake handles
#[derive(Debug, Clone, Copy)]
pub struct StubPipeline {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
}

impl Default for StubPipeline {
    fn default() -> Self {
        Self {
            pipeline: vk::Pipeline::from_raw(0xA1),
            layout: vk::PipelineLayout::from_raw(0xB1),
        }
    }
}

impl PipelineHandle for StubPipeline {
    fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }
}
