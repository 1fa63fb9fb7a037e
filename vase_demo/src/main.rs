//! Vase demo
//!
//! Renders two vases and a floor lit by six point lights circling the scene.
//! Move with WASD/E/Q, look around with the arrow keys, quit with Escape.

mod scene;

use std::process::ExitCode;

use ash::vk;
use frame_engine::config::{Config, ConfigError};
use frame_engine::core::ApplicationConfig;
use frame_engine::foundation::logging;
use frame_engine::foundation::math::Vec3;
use frame_engine::foundation::time::FrameClock;
use frame_engine::input::KeyboardMovementController;
use frame_engine::render::vulkan::{
    Buffer, DescriptorPoolBuilder, DescriptorSetLayoutBuilder, DescriptorWriter, VulkanContext,
};
use frame_engine::render::{
    Camera, FrameContext, GlobalUbo, MeshRenderSystem, PointLightSystem, RenderDevice, RenderError, Renderer,
    Window, WindowError, MAX_FRAMES_IN_FLIGHT,
};
use frame_engine::scene::GameObject;

const CONFIG_PATH: &str = "vase_demo.toml";

/// Anything that ends the demo early
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("window: {0}")]
    Window(#[from] WindowError),

    #[error("rendering: {0}")]
    Render(#[from] RenderError),
}

fn run(config: &ApplicationConfig) -> Result<(), DemoError> {
    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)?;
    let context = VulkanContext::new(
        &mut window,
        &config.renderer.application_name,
        config.renderer.validation_enabled(),
    )?;
    let mut renderer = Renderer::new(&context, &mut window, config.renderer.clear_color)?;

    let global_pool = DescriptorPoolBuilder::new()
        .max_sets(MAX_FRAMES_IN_FLIGHT as u32)
        .add_pool_size(vk::DescriptorType::UNIFORM_BUFFER, MAX_FRAMES_IN_FLIGHT as u32)
        .build(context.device())?;

    let mut ubo_buffers = (0..MAX_FRAMES_IN_FLIGHT)
        .map(|_| {
            let mut buffer = Buffer::new(
                &context,
                std::mem::size_of::<GlobalUbo>() as vk::DeviceSize,
                1,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                vk::MemoryPropertyFlags::HOST_VISIBLE,
                1,
            )?;
            buffer.map()?;
            Ok(buffer)
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    let global_set_layout = DescriptorSetLayoutBuilder::new()
        .add_uniform_buffer(0, vk::ShaderStageFlags::ALL_GRAPHICS)
        .build(context.device())?;

    let global_descriptor_sets = ubo_buffers
        .iter()
        .map(|buffer| {
            DescriptorWriter::new(&global_set_layout, &global_pool)
                .write_buffer(0, buffer.descriptor_info())
                .build()
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    let mesh_system = MeshRenderSystem::new(
        context.device(),
        renderer.swapchain_render_pass(),
        global_set_layout.handle(),
        &config.renderer.shader_dir,
    )?;
    let point_light_system = PointLightSystem::new(
        context.device(),
        renderer.swapchain_render_pass(),
        global_set_layout.handle(),
        &config.renderer.shader_dir,
        config.frame.light_rotation_speed,
    )?;

    let mut game_objects = scene::load_game_objects(&context)?;

    let mut camera = Camera::new();
    camera.set_view_target(Vec3::new(-1.0, -2.0, -2.0), Vec3::new(0.0, 0.0, 2.5), Vec3::new(0.0, -1.0, 0.0));

    let mut viewer = GameObject::create();
    viewer.transform.translation = Vec3::from(config.camera.start_position);
    let camera_controller = KeyboardMovementController::default();
    let mut clock = FrameClock::new(config.frame.max_frame_time);

    log::info!("Entering main loop");
    let mut frame_loop = || -> Result<(), DemoError> {
        while !window.should_close() {
            window.poll_events();
            let frame_time = clock.tick();

            camera_controller.move_in_plane_xz(&window, frame_time, &mut viewer);
            camera.set_view_yxz(viewer.transform.translation, viewer.transform.rotation);
            camera.set_perspective_projection(
                config.camera.fov_degrees.to_radians(),
                renderer.aspect_ratio(),
                config.camera.near,
                config.camera.far,
            );

            let Some(command_buffer) = renderer.begin_frame(&mut window)? else {
                continue;
            };
            let frame_index = renderer.frame_index();
            let mut frame = FrameContext {
                frame_index,
                frame_time,
                command_buffer,
                encoder: context.encoder(),
                camera: &camera,
                global_descriptor_set: global_descriptor_sets[frame_index],
                game_objects: &mut game_objects,
            };

            // update
            let mut ubo = GlobalUbo::default();
            ubo.set_camera(&camera);
            point_light_system.update(&mut frame, &mut ubo);
            ubo_buffers[frame_index].write_to_buffer(ubo.as_bytes(), 0);
            ubo_buffers[frame_index].flush()?;

            // render
            renderer.begin_swapchain_render_pass(command_buffer);
            mesh_system.render_game_objects(&frame);
            point_light_system.render(&frame);
            renderer.end_swapchain_render_pass(command_buffer);
            renderer.end_frame(&mut window)?;
        }
        Ok(())
    };
    let loop_result = frame_loop();

    // Resources created after the renderer drop first, so the queue must be drained on every exit path
    let idle_result = context.wait_idle();
    log::info!("Main loop exited after {} frames", clock.frame_count());
    match (loop_result, idle_result) {
        (Err(e), Err(idle_error)) => {
            log::warn!("Failed to wait for device idle after loop error: {}", idle_error);
            Err(e)
        }
        (loop_result, idle_result) => loop_result.and(idle_result.map_err(DemoError::from)),
    }
}

fn main() -> ExitCode {
    let config = match ApplicationConfig::load_or_default(CONFIG_PATH).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            logging::init();
            log::error!("Invalid configuration in {}: {}", CONFIG_PATH, e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_level(&config.logging.level);
    log::info!("Starting vase demo");

    match run(&config) {
        Ok(()) => {
            log::info!("Vase demo finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Vase demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
