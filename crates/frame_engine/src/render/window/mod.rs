//! Window system integration
//!
//! [`WindowSurface`] is what the frame synchronizer needs from a window;
//! [`Window`] is the GLFW implementation.

mod glfw_window;

use ash::vk;
use thiserror::Error;

pub use glfw_window::Window;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The window could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Drawable-surface queries used during swapchain recreation
pub trait WindowSurface {
    /// Current framebuffer size in pixels; zero while minimized
    fn extent(&self) -> vk::Extent2D;

    /// Whether the framebuffer was resized since the flag was last reset
    fn was_resized(&self) -> bool;

    /// Clear the pending-resize flag
    fn reset_resized_flag(&mut self);

    /// Block until at least one window event arrives
    fn wait_events(&mut self);
}
