//! Device and swapchain seams used by the frame synchronizer

use ash::vk;

use crate::render::frame::CommandEncoder;
use crate::render::RenderResult;

/// Number of frames the CPU may record ahead of the GPU.
///
/// Each slot owns one command buffer, one uniform buffer and one set of
/// synchronization objects.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Result of acquiring the next presentable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image is available for rendering
    Ready {
        /// Index of the acquired swapchain image
        image_index: u32,
        /// The swapchain still works but no longer matches the surface exactly
        suboptimal: bool,
    },
    /// The swapchain no longer matches the surface and must be recreated
    OutOfDate,
}

/// Result of submitting and presenting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// Presented on a matching swapchain
    Presented,
    /// Presented, but the swapchain should be recreated
    Suboptimal,
    /// Not presented; the swapchain must be recreated
    OutOfDate,
}

impl PresentOutcome {
    /// Whether the swapchain has to be rebuilt after this present
    pub fn is_stale(self) -> bool {
        !matches!(self, Self::Presented)
    }
}

/// Attachment formats of a swapchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainFormats {
    /// Presentable color image format
    pub color: vk::Format,
    /// Depth attachment format
    pub depth: vk::Format,
}

impl SwapchainFormats {
    /// Pipelines built against `self` stay valid for a swapchain with `other` formats
    pub fn compatible_with(&self, other: &Self) -> bool {
        self.color == other.color && self.depth == other.depth
    }
}

/// A set of presentable images together with their framebuffers, depth
/// buffers and per-slot synchronization.
pub trait SwapchainTarget {
    /// Wait for the fence of `frame_index`, then acquire the next image
    fn acquire_next_image(&mut self, frame_index: usize) -> RenderResult<AcquireOutcome>;

    /// Submit `cmd` for `image_index` using the synchronization of
    /// `frame_index`, then present the image
    fn submit_command_buffer(
        &mut self,
        cmd: vk::CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> RenderResult<PresentOutcome>;

    /// Image extent
    fn extent(&self) -> vk::Extent2D;

    /// Render pass compatible with every framebuffer of this swapchain
    fn render_pass(&self) -> vk::RenderPass;

    /// Framebuffer of one swapchain image
    fn framebuffer(&self, image_index: u32) -> vk::Framebuffer;

    /// Number of presentable images
    fn image_count(&self) -> usize;

    /// Attachment formats
    fn formats(&self) -> SwapchainFormats;
}

/// Device operations the frame synchronizer needs
pub trait RenderDevice {
    /// Swapchain type created by this device
    type Swapchain: SwapchainTarget;

    /// Build a swapchain for `extent`, reusing `previous` as a construction hint
    fn create_swapchain(
        &self,
        extent: vk::Extent2D,
        previous: Option<&Self::Swapchain>,
    ) -> RenderResult<Self::Swapchain>;

    /// Allocate primary command buffers from the graphics command pool
    fn allocate_command_buffers(&self, count: u32) -> RenderResult<Vec<vk::CommandBuffer>>;

    /// Return command buffers to the pool
    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]);

    /// Begin recording (implicitly resets the buffer)
    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> RenderResult<()>;

    /// Finish recording
    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> RenderResult<()>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> RenderResult<()>;

    /// Encoder that records into command buffers of this device
    fn encoder(&self) -> &dyn CommandEncoder;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_presented_is_fresh() {
        assert!(!PresentOutcome::Presented.is_stale());
        assert!(PresentOutcome::Suboptimal.is_stale());
        assert!(PresentOutcome::OutOfDate.is_stale());
    }

    #[test]
    fn test_format_compatibility() {
        let formats = SwapchainFormats {
            color: vk::Format::B8G8R8A8_SRGB,
            depth: vk::Format::D32_SFLOAT,
        };
        assert!(formats.compatible_with(&formats));

        let other_depth = SwapchainFormats {
            depth: vk::Format::D24_UNORM_S8_UINT,
            ..formats
        };
        assert!(!formats.compatible_with(&other_depth));

        let other_color = SwapchainFormats {
            color: vk::Format::R8G8B8A8_UNORM,
            ..formats
        };
        assert!(!formats.compatible_with(&other_color));
    }
}
