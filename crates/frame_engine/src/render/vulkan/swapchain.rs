//! Vulkan swapchain management
//!
//! [`VulkanSwapchain`] is the complete set of per-image and per-slot objects
//! that has to be rebuilt when the surface changes: presentable images and
//! their views, the forward render pass, one depth buffer and framebuffer per
//! image, and the synchronization of every frame slot.

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::{vk, Device};

use crate::render::frame::{AcquireOutcome, PresentOutcome, SwapchainFormats, SwapchainTarget, MAX_FRAMES_IN_FLIGHT};
use crate::render::vulkan::{DepthBuffer, Framebuffer, FrameSync, RenderPass, VulkanContext};
use crate::render::RenderResult;

const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// Swapchain with its render targets and frame synchronization
pub struct VulkanSwapchain {
    device: Device,
    swapchain_loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    framebuffers: Vec<Framebuffer>,
    depth_buffers: Vec<DepthBuffer>,
    render_pass: RenderPass,
    image_views: Vec<vk::ImageView>,
    frame_sync: Vec<FrameSync>,
    /// Fence of the slot currently rendering to each image, or null
    images_in_flight: Vec<vk::Fence>,
    surface_format: vk::SurfaceFormatKHR,
    depth_format: vk::Format,
    extent: vk::Extent2D,
}

impl VulkanSwapchain {
    /// Create a swapchain for `window_extent`, handing `previous` to the
    /// driver so in-flight presents of the old images can complete
    pub fn new(
        context: &VulkanContext,
        window_extent: vk::Extent2D,
        previous: Option<&VulkanSwapchain>,
    ) -> RenderResult<Self> {
        let device = context.device().clone();
        let surface = context.surface();
        let surface_loader = context.surface_loader();
        let physical_device = context.physical_device().device;

        let surface_caps =
            unsafe { surface_loader.get_physical_device_surface_capabilities(physical_device, surface)? };
        let surface_formats = unsafe { surface_loader.get_physical_device_surface_formats(physical_device, surface)? };
        let present_modes =
            unsafe { surface_loader.get_physical_device_surface_present_modes(physical_device, surface)? };

        let surface_format = choose_surface_format(&surface_formats);
        let present_mode = choose_present_mode(&present_modes);
        let extent = choose_extent(&surface_caps, window_extent);
        let depth_format = context.find_supported_format(
            &DEPTH_FORMAT_CANDIDATES,
            vk::ImageTiling::OPTIMAL,
            vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
        )?;

        let image_count = if surface_caps.max_image_count > 0 {
            (surface_caps.min_image_count + 1).min(surface_caps.max_image_count)
        } else {
            surface_caps.min_image_count + 1
        };

        let queue_families = [
            context.physical_device().graphics_family,
            context.physical_device().present_family,
        ];
        let old_swapchain = previous.map_or(vk::SwapchainKHR::null(), |previous| previous.swapchain);

        let mut create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(surface_caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        create_info = if queue_families[0] == queue_families[1] {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&queue_families)
        };

        let swapchain_loader = context.swapchain_loader().clone();
        let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };

        let render_pass = match RenderPass::new_forward_pass(
            device.clone(),
            SwapchainFormats {
                color: surface_format.format,
                depth: depth_format,
            },
        ) {
            Ok(render_pass) => render_pass,
            Err(e) => {
                unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
                return Err(e);
            }
        };

        // From here on the swapchain is owned by `target`, whose drop releases partial state
        let mut target = Self {
            device,
            swapchain_loader,
            swapchain,
            graphics_queue: context.graphics_queue(),
            present_queue: context.present_queue(),
            framebuffers: Vec::new(),
            depth_buffers: Vec::new(),
            render_pass,
            image_views: Vec::new(),
            frame_sync: Vec::new(),
            images_in_flight: Vec::new(),
            surface_format,
            depth_format,
            extent,
        };

        target.create_image_views()?;
        target.create_render_targets(context)?;
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            target.frame_sync.push(FrameSync::new(&target.device)?);
        }
        target.images_in_flight = vec![vk::Fence::null(); target.image_views.len()];

        log::debug!(
            "Created swapchain: {:?} {:?}, depth {:?}, {:?}, {} images",
            surface_format.format,
            surface_format.color_space,
            target.depth_format,
            present_mode,
            target.image_views.len()
        );

        Ok(target)
    }

    fn create_image_views(&mut self) -> RenderResult<()> {
        let images = unsafe { self.swapchain_loader.get_swapchain_images(self.swapchain)? };

        for image in images {
            let create_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.surface_format.format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = unsafe { self.device.create_image_view(&create_info, None)? };
            self.image_views.push(view);
        }
        Ok(())
    }

    fn create_render_targets(&mut self, context: &VulkanContext) -> RenderResult<()> {
        for i in 0..self.image_views.len() {
            let depth_buffer = DepthBuffer::new(context, self.extent, self.depth_format)?;
            let attachments = [self.image_views[i], depth_buffer.image_view()];
            self.depth_buffers.push(depth_buffer);

            let framebuffer =
                Framebuffer::new(self.device.clone(), self.render_pass.handle(), &attachments, self.extent)?;
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    /// Raw swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }
}

impl SwapchainTarget for VulkanSwapchain {
    fn acquire_next_image(&mut self, frame_index: usize) -> RenderResult<AcquireOutcome> {
        let sync = &self.frame_sync[frame_index];
        sync.in_flight.wait()?;

        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                sync.image_available.handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Ready {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    fn submit_command_buffer(
        &mut self,
        cmd: vk::CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> RenderResult<PresentOutcome> {
        let image = image_index as usize;
        let image_fence = self.images_in_flight[image];
        if image_fence != vk::Fence::null() {
            unsafe { self.device.wait_for_fences(&[image_fence], true, u64::MAX)? };
        }

        let sync = &self.frame_sync[frame_index];
        self.images_in_flight[image] = sync.in_flight.handle();

        let wait_semaphores = [sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [cmd];
        let signal_semaphores = [sync.render_finished.handle()];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        sync.in_flight.reset()?;
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], sync.in_flight.handle())?;
        }

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.swapchain_loader.queue_present(self.present_queue, &present_info) } {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.handle()
    }

    fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize].handle()
    }

    fn image_count(&self) -> usize {
        self.image_views.len()
    }

    fn formats(&self) -> SwapchainFormats {
        self.render_pass.formats()
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        self.framebuffers.clear();
        self.depth_buffers.clear();
        unsafe {
            for &image_view in &self.image_views {
                self.device.destroy_image_view(image_view, None);
            }
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|format| {
            format.format == vk::Format::B8G8R8A8_SRGB && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first().copied())
        .unwrap_or(vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        })
}

fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if present_modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, window_extent: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: window_extent
                .width
                .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: window_extent
                .height
                .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}
