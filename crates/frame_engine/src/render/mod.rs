//! Rendering
//!
//! The frame lifecycle in [`frame`] is written against small traits
//! ([`RenderDevice`], [`SwapchainTarget`], [`CommandEncoder`], [`WindowSurface`])
//! that the [`vulkan`] and [`window`] modules implement. Render systems in
//! [`systems`] only ever see a [`FrameContext`].

pub mod camera;
pub mod error;
pub mod frame;
pub mod model;
pub mod systems;
pub mod ubo;
pub mod vulkan;
pub mod window;

pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use frame::{
    AcquireOutcome, CommandEncoder, FrameContext, PassRecorder, PresentOutcome, RenderDevice, Renderer,
    SwapchainTarget, MAX_FRAMES_IN_FLIGHT,
};
pub use model::Model;
pub use systems::{MeshRenderSystem, PointLightSystem};
pub use ubo::{GlobalUbo, PointLightData, MAX_POINT_LIGHTS};
pub use window::{Window, WindowError, WindowSurface};
