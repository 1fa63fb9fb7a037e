//! # Frame Engine
//!
//! A small Vulkan renderer built around a frame lifecycle with multiple frames
//! in flight.
//!
//! ## Features
//!
//! - **Frame lifecycle**: acquire, record, submit and present with
//!   [`MAX_FRAMES_IN_FLIGHT`](render::MAX_FRAMES_IN_FLIGHT) slots
//! - **Swapchain recreation**: on out-of-date, suboptimal or resized surfaces,
//!   including the minimized window case
//! - **Render systems**: an opaque mesh pass and an alpha-blended point-light pass
//! - **Configuration**: TOML or RON files through [`config::Config`]
//!
//! ## Frame loop
//!
//! ```rust,no_run
//! use frame_engine::prelude::*;
//!
//! fn run(renderer: &mut Renderer<'_, VulkanContext>, window: &mut Window) -> RenderResult<()> {
//!     while !window.should_close() {
//!         window.poll_events();
//!         let Some(command_buffer) = renderer.begin_frame(window)? else {
//!             continue;
//!         };
//!         renderer.begin_swapchain_render_pass(command_buffer);
//!         // render systems record here
//!         renderer.end_swapchain_render_pass(command_buffer);
//!         renderer.end_frame(window)?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::ApplicationConfig,
        foundation::{
            math::{Mat4, Transform, Vec3},
            time::FrameClock,
        },
        input::KeyboardMovementController,
        render::{
            vulkan::VulkanContext, Camera, FrameContext, GlobalUbo, MeshRenderSystem, PointLightSystem,
            RenderError, RenderResult, Renderer, Window,
        },
        scene::{GameObject, GameObjectMap, MeshData},
    };
}
