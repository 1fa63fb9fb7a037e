//! Render error types

use ash::vk;
use thiserror::Error;

use crate::render::window::WindowError;

/// Fatal rendering errors.
///
/// A stale swapchain is not an error; it is reported through
/// [`AcquireOutcome`](crate::render::frame::AcquireOutcome) and
/// [`PresentOutcome`](crate::render::frame::PresentOutcome).
#[derive(Error, Debug)]
pub enum RenderError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Vulkan(#[from] vk::Result),

    /// A recreated swapchain came back with a different color or depth format
    #[error("Swapchain image or depth format has changed")]
    SwapchainFormatChanged,

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No suitable memory type found for allocation
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,

    /// Shader binary could not be read
    #[error("Failed to read shader {path}: {source}")]
    ShaderIo {
        /// Path of the shader file
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Buffer contents are not a whole number of instances
    #[error("{len} bytes is not a multiple of the {instance_size}-byte instance size")]
    PartialInstance {
        /// Length of the data in bytes
        len: usize,
        /// Size of one instance in bytes
        instance_size: u64,
    },

    /// Mesh data could not be loaded
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// Window system error
    #[error("Window error: {0}")]
    Window(#[from] WindowError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
