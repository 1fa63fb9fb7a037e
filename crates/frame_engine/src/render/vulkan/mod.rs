//! Vulkan backend
//!
//! Thin RAII wrappers over `ash` plus the two implementations the frame
//! lifecycle is generic over: [`VulkanContext`] as the render device and
//! [`VulkanSwapchain`] as its swapchain.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod descriptor;
pub mod framebuffer;
pub mod model;
pub mod pipeline;
pub mod render_pass;
pub mod swapchain;
pub mod sync;

pub use buffer::Buffer;
pub use commands::CommandPool;
pub use context::{LogicalDevice, PhysicalDeviceInfo, VulkanContext, VulkanInstance};
pub use descriptor::{DescriptorPool, DescriptorPoolBuilder, DescriptorSetLayout, DescriptorSetLayoutBuilder, DescriptorWriter};
pub use framebuffer::{DepthBuffer, Framebuffer};
pub use model::VulkanModel;
pub use pipeline::{GraphicsPipeline, PipelineConfig, PipelineHandle, PipelineLayout, ShaderModule};
pub use render_pass::RenderPass;
pub use swapchain::VulkanSwapchain;
pub use sync::{Fence, FrameSync, Semaphore};
