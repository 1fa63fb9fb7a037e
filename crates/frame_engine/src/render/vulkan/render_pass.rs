//! Render pass management

use ash::{vk, Device};

use crate::render::frame::SwapchainFormats;
use crate::render::RenderResult;

/// Render pass wrapper with RAII cleanup
///
/// Remembers the attachment formats it was built for, so a recreated
/// swapchain can be checked against the pipelines created for this pass.
pub struct RenderPass {
    device: Device,
    render_pass: vk::RenderPass,
    formats: SwapchainFormats,
}

/// Cleared-on-load attachment with no stencil use
fn cleared_attachment(
    format: vk::Format,
    store_op: vk::AttachmentStoreOp,
    final_layout: vk::ImageLayout,
) -> vk::AttachmentDescription {
    vk::AttachmentDescription::builder()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(store_op)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(final_layout)
        .build()
}

impl RenderPass {
    /// Single-subpass forward pass over the swapchain image (attachment 0,
    /// presented at the end) and a depth image (attachment 1, discarded)
    pub fn new_forward_pass(device: Device, formats: SwapchainFormats) -> RenderResult<Self> {
        let attachments = [
            cleared_attachment(
                formats.color,
                vk::AttachmentStoreOp::STORE,
                vk::ImageLayout::PRESENT_SRC_KHR,
            ),
            cleared_attachment(
                formats.depth,
                vk::AttachmentStoreOp::DONT_CARE,
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            ),
        ];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let depth_ref = vk::AttachmentReference {
            attachment: 1,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };

        let subpasses = [vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref)
            .build()];

        // Attachment writes wait for the previous frame's use of the images
        let stages = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS;
        let dependencies = [vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: stages,
            dst_stage_mask: stages,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            dependency_flags: vk::DependencyFlags::empty(),
        }];

        let create_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);
        let render_pass = unsafe { device.create_render_pass(&create_info, None)? };

        Ok(Self {
            device,
            render_pass,
            formats,
        })
    }

    /// Get the render pass handle
    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Attachment formats the pass was built for
    pub fn formats(&self) -> SwapchainFormats {
        self.formats
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
