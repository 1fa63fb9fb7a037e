//! Drawable mesh abstraction

use ash::vk;

use crate::render::frame::CommandEncoder;

/// A drawable mesh shared between scene objects.
///
/// `bind` must be recorded before `draw` on the same command buffer.
pub trait Model {
    /// Bind vertex (and index) buffers
    fn bind(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer);

    /// Record the draw call
    fn draw(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer);
}
