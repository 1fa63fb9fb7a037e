//! # Frame Synchronizer
//!
//! [`Renderer`] owns the swapchain and one command buffer per frame slot and
//! drives the acquire / record / submit / present cycle:
//!
//! ```text
//! Idle --begin_frame--> FrameOpen --end_frame--> Idle
//!   \--begin_frame (stale)--> recreate --> Idle
//! ```
//!
//! The slot index advances round-robin on every `end_frame`, independent of
//! the swapchain image index. A stale swapchain (out of date, suboptimal or a
//! pending window resize) is rebuilt in place; any other failure is returned
//! to the caller.

use ash::vk;

use crate::render::frame::{
    AcquireOutcome, PassRecorder, RenderDevice, SwapchainTarget, MAX_FRAMES_IN_FLIGHT,
};
use crate::render::window::WindowSurface;
use crate::render::{RenderError, RenderResult};

/// Per-frame synchronizer over a [`RenderDevice`]
pub struct Renderer<'d, D: RenderDevice> {
    device: &'d D,
    swapchain: D::Swapchain,
    command_buffers: Vec<vk::CommandBuffer>,
    pass_recorder: PassRecorder,
    current_image_index: u32,
    current_frame_index: usize,
    is_frame_started: bool,
}

impl<'d, D: RenderDevice> Renderer<'d, D> {
    /// Create the swapchain for the window's current drawable size and
    /// allocate one command buffer per frame slot
    pub fn new<W>(device: &'d D, window: &mut W, clear_color: [f32; 4]) -> RenderResult<Self>
    where
        W: WindowSurface + ?Sized,
    {
        let extent = wait_for_drawable_extent(window);
        let swapchain = device.create_swapchain(extent, None)?;
        let command_buffers = device.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;

        log::info!(
            "Renderer created: {}x{} swapchain, {} images, {} frames in flight",
            extent.width,
            extent.height,
            swapchain.image_count(),
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            device,
            swapchain,
            command_buffers,
            pass_recorder: PassRecorder::new(clear_color),
            current_image_index: 0,
            current_frame_index: 0,
            is_frame_started: false,
        })
    }

    /// Start a frame.
    ///
    /// Returns the slot's command buffer in the recording state, or `None`
    /// when the swapchain was stale and has been recreated; the caller skips
    /// drawing for that iteration.
    pub fn begin_frame<W>(&mut self, window: &mut W) -> RenderResult<Option<vk::CommandBuffer>>
    where
        W: WindowSurface + ?Sized,
    {
        debug_assert!(!self.is_frame_started, "Can't call begin_frame while already in progress");

        match self.swapchain.acquire_next_image(self.current_frame_index)? {
            AcquireOutcome::OutOfDate => {
                log::debug!("Swapchain out of date on acquire, abandoning frame");
                self.recreate_swapchain(window)?;
                Ok(None)
            }
            AcquireOutcome::Ready {
                image_index,
                suboptimal,
            } => {
                if suboptimal {
                    log::trace!("Acquired image {} from a suboptimal swapchain", image_index);
                }
                self.current_image_index = image_index;

                let cmd = self.command_buffers[self.current_frame_index];
                self.device.begin_command_buffer(cmd)?;
                self.is_frame_started = true;
                Ok(Some(cmd))
            }
        }
    }

    /// Finish the frame: end recording, submit and present.
    ///
    /// The frame is closed and the slot index advanced even when a fatal
    /// error is returned.
    pub fn end_frame<W>(&mut self, window: &mut W) -> RenderResult<()>
    where
        W: WindowSurface + ?Sized,
    {
        debug_assert!(self.is_frame_started, "Can't call end_frame while frame is not in progress");

        let cmd = self.command_buffers[self.current_frame_index];
        let submitted = match self.device.end_command_buffer(cmd) {
            Ok(()) => self
                .swapchain
                .submit_command_buffer(cmd, self.current_image_index, self.current_frame_index),
            Err(e) => Err(e),
        };

        self.is_frame_started = false;
        self.current_frame_index = (self.current_frame_index + 1) % MAX_FRAMES_IN_FLIGHT;

        let outcome = submitted?;
        let resized = window.was_resized();
        if outcome.is_stale() || resized {
            if outcome.is_stale() {
                log::debug!("Swapchain stale after present ({:?}), recreating", outcome);
            } else {
                log::debug!("Window resized, recreating swapchain");
            }
            window.reset_resized_flag();
            self.recreate_swapchain(window)?;
        }
        Ok(())
    }

    /// Begin the swapchain render pass on the current frame's command buffer
    pub fn begin_swapchain_render_pass(&self, cmd: vk::CommandBuffer) {
        debug_assert!(
            self.is_frame_started,
            "Can't call begin_swapchain_render_pass if frame is not in progress"
        );
        debug_assert_eq!(
            cmd,
            self.command_buffers[self.current_frame_index],
            "Can't begin render pass on command buffer from a different frame"
        );

        self.pass_recorder.begin(
            self.device.encoder(),
            cmd,
            self.swapchain.render_pass(),
            self.swapchain.framebuffer(self.current_image_index),
            self.swapchain.extent(),
        );
    }

    /// End the swapchain render pass
    pub fn end_swapchain_render_pass(&self, cmd: vk::CommandBuffer) {
        debug_assert!(
            self.is_frame_started,
            "Can't call end_swapchain_render_pass if frame is not in progress"
        );
        debug_assert_eq!(
            cmd,
            self.command_buffers[self.current_frame_index],
            "Can't end render pass on command buffer from a different frame"
        );

        self.pass_recorder.end(self.device.encoder(), cmd);
    }

    /// Slot index of the open frame
    pub fn frame_index(&self) -> usize {
        debug_assert!(self.is_frame_started, "Cannot get frame index when frame not in progress");
        self.current_frame_index
    }

    /// Command buffer of the open frame
    pub fn current_command_buffer(&self) -> vk::CommandBuffer {
        debug_assert!(self.is_frame_started, "Cannot get command buffer when frame not in progress");
        self.command_buffers[self.current_frame_index]
    }

    /// Whether a frame is between `begin_frame` and `end_frame`
    pub fn is_frame_in_progress(&self) -> bool {
        self.is_frame_started
    }

    /// Width over height of the swapchain extent
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.swapchain.extent();
        extent.width as f32 / extent.height as f32
    }

    /// Render pass the mesh and light pipelines must be compatible with
    pub fn swapchain_render_pass(&self) -> vk::RenderPass {
        self.swapchain.render_pass()
    }

    /// Current swapchain
    pub fn swapchain(&self) -> &D::Swapchain {
        &self.swapchain
    }

    /// Rebuild the swapchain for the window's current drawable size.
    ///
    /// Blocks on window events while the window is minimized, then waits for
    /// the device to go idle. The new swapchain must keep the old color and
    /// depth formats so existing pipelines stay valid.
    fn recreate_swapchain<W>(&mut self, window: &mut W) -> RenderResult<()>
    where
        W: WindowSurface + ?Sized,
    {
        let extent = wait_for_drawable_extent(window);
        self.device.wait_idle()?;

        let swapchain = self.device.create_swapchain(extent, Some(&self.swapchain))?;
        if !self.swapchain.formats().compatible_with(&swapchain.formats()) {
            log::error!(
                "Swapchain formats changed from {:?} to {:?}",
                self.swapchain.formats(),
                swapchain.formats()
            );
            return Err(RenderError::SwapchainFormatChanged);
        }

        // Replacing the field releases the old swapchain
        self.swapchain = swapchain;
        log::info!("Swapchain recreated at {}x{}", extent.width, extent.height);
        Ok(())
    }
}

impl<D: RenderDevice> Drop for Renderer<'_, D> {
    fn drop(&mut self) {
        // Submitted buffers may still be pending when the loop exits on an error
        if let Err(e) = self.device.wait_idle() {
            log::warn!("Failed to wait for device idle before freeing command buffers: {}", e);
        }
        self.device.free_command_buffers(&self.command_buffers);
    }
}

/// Block on window events until the drawable extent is non-zero in both dimensions
fn wait_for_drawable_extent<W>(window: &mut W) -> vk::Extent2D
where
    W: WindowSurface + ?Sized,
{
    let mut extent = window.extent();
    if extent.width == 0 || extent.height == 0 {
        log::info!("Window minimized, waiting for a drawable size");
    }
    while extent.width == 0 || extent.height == 0 {
        window.wait_events();
        extent = window.extent();
    }
    extent
}
