//! Swapchain render pass recording

use ash::vk;

use crate::render::frame::CommandEncoder;

/// Background color used when none is configured
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.01, 0.01, 0.01, 1.0];

/// Opens and closes the swapchain render pass.
///
/// Clears color to the configured background and depth/stencil to 1.0/0,
/// covers the whole swapchain extent and sets a matching dynamic viewport and
/// scissor so pipelines never depend on the window size.
#[derive(Debug, Clone, Copy)]
pub struct PassRecorder {
    clear_color: [f32; 4],
}

impl Default for PassRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_COLOR)
    }
}

impl PassRecorder {
    /// Create a recorder clearing to `clear_color`
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self { clear_color }
    }

    /// Background color
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Begin the pass on `framebuffer` and set viewport and scissor to `extent`
    pub fn begin(
        &self,
        encoder: &dyn CommandEncoder,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
    ) {
        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
            },
        ];

        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        encoder.begin_render_pass(cmd, render_pass, framebuffer, render_area, &clear_values);

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        encoder.set_viewport(cmd, viewport);
        encoder.set_scissor(cmd, render_area);
    }

    /// Close the pass
    pub fn end(&self, encoder: &dyn CommandEncoder, cmd: vk::CommandBuffer) {
        encoder.end_render_pass(cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::frame::testing::{RecordedCommand, RecordingEncoder};
    use ash::vk::Handle;

    #[test]
    fn test_begin_covers_full_extent() {
        let encoder = RecordingEncoder::default();
        let cmd = vk::CommandBuffer::from_raw(7);
        let render_pass = vk::RenderPass::from_raw(11);
        let framebuffer = vk::Framebuffer::from_raw(12);
        let extent = vk::Extent2D { width: 640, height: 360 };

        PassRecorder::new([0.2, 0.3, 0.4, 1.0]).begin(&encoder, cmd, render_pass, framebuffer, extent);

        let commands = encoder.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            RecordedCommand::BeginRenderPass {
                cmd,
                render_pass,
                framebuffer,
                render_area: (0, 0, 640, 360),
                clear_color: [0.2, 0.3, 0.4, 1.0],
                clear_depth: 1.0,
                clear_stencil: 0,
            }
        );
        assert_eq!(
            commands[1],
            RecordedCommand::SetViewport {
                cmd,
                viewport: [0.0, 0.0, 640.0, 360.0, 0.0, 1.0],
            }
        );
        assert_eq!(
            commands[2],
            RecordedCommand::SetScissor {
                cmd,
                scissor: (0, 0, 640, 360),
            }
        );
    }

    #[test]
    fn test_end_closes_pass() {
        let encoder = RecordingEncoder::default();
        let cmd = vk::CommandBuffer::from_raw(3);
        PassRecorder::default().end(&encoder, cmd);
        assert_eq!(encoder.commands(), vec![RecordedCommand::EndRenderPass { cmd }]);
    }
}
