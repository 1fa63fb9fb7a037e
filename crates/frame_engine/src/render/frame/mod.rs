//! Frame lifecycle: swapchain synchronization, pass recording and the
//! per-frame context handed to render systems.

mod device;
mod encoder;
mod frame_info;
mod pass;
mod renderer;

#[cfg(test)]
pub(crate) mod testing;

pub use device::{
    AcquireOutcome, PresentOutcome, RenderDevice, SwapchainFormats, SwapchainTarget, MAX_FRAMES_IN_FLIGHT,
};
pub use encoder::CommandEncoder;
pub use frame_info::FrameContext;
pub use pass::{PassRecorder, DEFAULT_CLEAR_COLOR};
pub use renderer::Renderer;
