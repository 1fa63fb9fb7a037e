//! Per-frame data shared by the render systems

use ash::vk;

use crate::render::frame::CommandEncoder;
use crate::render::Camera;
use crate::scene::GameObjectMap;

/// Everything a render system needs for one frame.
///
/// Built by the application loop after a successful `begin_frame` and
/// dropped before `end_frame`; it only borrows.
pub struct FrameContext<'a> {
    /// Frame slot in `0..MAX_FRAMES_IN_FLIGHT`
    pub frame_index: usize,
    /// Clamped time since the previous frame, in seconds
    pub frame_time: f32,
    /// Command buffer returned by `begin_frame`
    pub command_buffer: vk::CommandBuffer,
    /// Encoder recording into `command_buffer`
    pub encoder: &'a dyn CommandEncoder,
    /// Viewer for this frame
    pub camera: &'a Camera,
    /// Descriptor set bound to this slot's uniform buffer
    pub global_descriptor_set: vk::DescriptorSet,
    /// Live scene objects
    pub game_objects: &'a mut GameObjectMap,
}
