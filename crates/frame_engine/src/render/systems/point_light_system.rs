//! Point-light pass: animates the lights, publishes them to the global UBO and
//! draws one alpha-blended billboard per light, farthest first.

use std::mem::size_of;
use std::path::Path;

use ash::{vk, Device};

use crate::foundation::math::{rotate_about_axis, Vec3};
use crate::render::frame::FrameContext;
use crate::render::ubo::{GlobalUbo, PointLightData, MAX_POINT_LIGHTS};
use crate::render::vulkan::{GraphicsPipeline, PipelineConfig, PipelineHandle, PipelineLayout};
use crate::render::RenderResult;
use crate::scene::GameObjectId;

/// Angular speed of the light ring in radians per second
pub const DEFAULT_LIGHT_ROTATION_SPEED: f32 = 0.5;

/// Vertices of the billboard quad generated in the vertex shader
const BILLBOARD_VERTEX_COUNT: u32 = 6;

const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags =
    vk::ShaderStageFlags::from_raw(vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw());

/// Per-light push data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightPushConstants {
    /// World position (w ignored)
    pub position: [f32; 4],
    /// Color (rgb) and intensity (w)
    pub color: [f32; 4],
    /// Billboard radius
    pub radius: f32,
}

unsafe impl bytemuck::Pod for PointLightPushConstants {}
unsafe impl bytemuck::Zeroable for PointLightPushConstants {}

/// Light animation and billboard drawing
pub struct PointLightSystem<P: PipelineHandle = GraphicsPipeline> {
    pipeline: P,
    rotation_speed: f32,
}

impl PointLightSystem<GraphicsPipeline> {
    /// Build the `point_light` pipeline for `render_pass`
    pub fn new(
        device: &Device,
        render_pass: vk::RenderPass,
        global_set_layout: vk::DescriptorSetLayout,
        shader_dir: impl AsRef<Path>,
        rotation_speed: f32,
    ) -> RenderResult<Self> {
        let push_constant_range = vk::PushConstantRange {
            stage_flags: PUSH_CONSTANT_STAGES,
            offset: 0,
            size: size_of::<PointLightPushConstants>() as u32,
        };
        let layout = PipelineLayout::new(device, &[global_set_layout], Some(push_constant_range))?;

        let config = PipelineConfig::default().enable_alpha_blending().without_vertex_input();
        let shader_dir = shader_dir.as_ref();
        let pipeline = GraphicsPipeline::new(
            device,
            shader_dir.join("point_light.vert.spv"),
            shader_dir.join("point_light.frag.spv"),
            &config,
            render_pass,
            layout,
        )?;

        log::debug!("Point light system ready (rotation speed {rotation_speed} rad/s)");
        Ok(Self::from_pipeline(pipeline, rotation_speed))
    }
}

impl<P: PipelineHandle> PointLightSystem<P> {
    /// Use an existing pipeline whose layout takes [`PointLightPushConstants`]
    pub fn from_pipeline(pipeline: P, rotation_speed: f32) -> Self {
        Self {
            pipeline,
            rotation_speed,
        }
    }

    /// Rotate every light around the world `-y` axis and copy the lights into `ubo`.
    ///
    /// Lights are written in object iteration order and `num_lights` is set to
    /// the count.
    ///
    /// # Panics
    /// If the scene holds more than [`MAX_POINT_LIGHTS`] lights.
    pub fn update(&self, frame: &mut FrameContext, ubo: &mut GlobalUbo) {
        let angle = self.rotation_speed * frame.frame_time;
        let axis = Vec3::new(0.0, -1.0, 0.0);

        let mut light_index = 0;
        for object in frame.game_objects.values_mut() {
            let Some(point_light) = object.point_light else {
                continue;
            };

            debug_assert!(
                light_index < MAX_POINT_LIGHTS,
                "Point lights exceed maximum specified ({MAX_POINT_LIGHTS})"
            );

            object.transform.translation = rotate_about_axis(object.transform.translation, axis, angle);

            let position = object.transform.translation;
            ubo.point_lights[light_index] = PointLightData {
                position: [position.x, position.y, position.z, 1.0],
                color: [object.color.x, object.color.y, object.color.z, point_light.light_intensity],
            };
            light_index += 1;
        }

        ubo.num_lights = light_index as i32;
    }

    /// Draw the light billboards back to front.
    ///
    /// Lights at equal distance keep their iteration order.
    pub fn render(&self, frame: &FrameContext) {
        let camera_position = frame.camera.position();

        let mut sorted: Vec<(f32, GameObjectId)> = frame
            .game_objects
            .values()
            .filter(|object| object.point_light.is_some())
            .map(|object| {
                let offset = camera_position - object.transform.translation;
                (offset.norm_squared(), object.id())
            })
            .collect();
        sorted.sort_by(|a, b| b.0.total_cmp(&a.0));

        let encoder = frame.encoder;
        let cmd = frame.command_buffer;
        encoder.bind_pipeline(cmd, self.pipeline.handle());
        encoder.bind_descriptor_sets(cmd, self.pipeline.layout(), 0, &[frame.global_descriptor_set]);

        for (_, id) in sorted {
            let Some(object) = frame.game_objects.get(&id) else {
                continue;
            };
            let Some(point_light) = object.point_light else {
                continue;
            };

            let position = object.transform.translation;
            let push = PointLightPushConstants {
                position: [position.x, position.y, position.z, 1.0],
                color: [object.color.x, object.color.y, object.color.z, point_light.light_intensity],
                radius: object.transform.scale.x,
            };
            encoder.push_constants(cmd, self.pipeline.layout(), PUSH_CONSTANT_STAGES, bytemuck::bytes_of(&push));
            encoder.draw(cmd, BILLBOARD_VERTEX_COUNT, 1, 0, 0);
        }
    }

    /// Radians per second the lights turn
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ash::vk::Handle;

    use crate::render::frame::testing::{RecordedCommand, RecordingEncoder, StubPipeline};
    use crate::render::Camera;
    use crate::scene::{GameObject, GameObjectMap};

    fn frame<'a>(
        encoder: &'a RecordingEncoder,
        camera: &'a Camera,
        objects: &'a mut GameObjectMap,
        frame_time: f32,
    ) -> FrameContext<'a> {
        FrameContext {
            frame_index: 1,
            frame_time,
            command_buffer: vk::CommandBuffer::from_raw(101),
            encoder,
            camera,
            global_descriptor_set: vk::DescriptorSet::from_raw(0xD1),
            game_objects: objects,
        }
    }

    fn light_at(position: Vec3, objects: &mut GameObjectMap) -> GameObjectId {
        let mut light = GameObject::make_point_light(0.2, 0.1, Vec3::new(1.0, 0.5, 0.25));
        light.transform.translation = position;
        light.insert_into(objects)
    }

    fn system() -> PointLightSystem<StubPipeline> {
        PointLightSystem::from_pipeline(StubPipeline::default(), DEFAULT_LIGHT_ROTATION_SPEED)
    }

    fn pushed_positions(encoder: &RecordingEncoder) -> Vec<[f32; 4]> {
        encoder
            .push_constant_payloads()
            .iter()
            .map(|bytes| bytemuck::pod_read_unaligned::<PointLightPushConstants>(bytes).position)
            .collect()
    }

    #[test]
    fn test_push_constants_are_tightly_packed() {
        assert_eq!(size_of::<PointLightPushConstants>(), 36);
    }

    #[test]
    fn test_zero_frame_time_leaves_light_in_place() {
        let mut objects = GameObjectMap::new();
        let id = light_at(Vec3::new(1.0, 0.0, 0.0), &mut objects);

        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        let mut ubo = GlobalUbo::default();
        system().update(&mut frame(&encoder, &camera, &mut objects, 0.0), &mut ubo);

        assert_relative_eq!(objects[&id].transform.translation, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ubo.num_lights, 1);
        assert_eq!(ubo.point_lights[0].position, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(ubo.point_lights[0].color, [1.0, 0.5, 0.25, 0.2]);
    }

    #[test]
    fn test_rotation_scales_with_frame_time() {
        let mut objects = GameObjectMap::new();
        let start = Vec3::new(1.0, 0.3, -0.5);
        let id = light_at(start, &mut objects);

        let frame_time = 0.8;
        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        let mut ubo = GlobalUbo::default();
        system().update(&mut frame(&encoder, &camera, &mut objects, frame_time), &mut ubo);

        let expected = rotate_about_axis(start, Vec3::new(0.0, -1.0, 0.0), DEFAULT_LIGHT_ROTATION_SPEED * frame_time);
        let moved = objects[&id].transform.translation;
        assert_relative_eq!(moved, expected, epsilon = 1e-6);
        // Rotation about the vertical axis keeps height and radius
        assert_relative_eq!(moved.y, start.y, epsilon = 1e-6);
        assert_relative_eq!(moved.xz().norm(), start.xz().norm(), epsilon = 1e-6);
        assert_relative_eq!(ubo.point_lights[0].position[0], expected.x, epsilon = 1e-6);
    }

    #[test]
    fn test_non_light_objects_are_not_published() {
        let mut objects = GameObjectMap::new();
        GameObject::create().insert_into(&mut objects);
        light_at(Vec3::new(0.0, 0.0, 1.0), &mut objects);
        GameObject::create().insert_into(&mut objects);

        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        let mut ubo = GlobalUbo::default();
        system().update(&mut frame(&encoder, &camera, &mut objects, 0.1), &mut ubo);
        assert_eq!(ubo.num_lights, 1);
    }

    fn update_too_many_lights() {
        let mut objects = GameObjectMap::new();
        for i in 0..=MAX_POINT_LIGHTS {
            light_at(Vec3::new(i as f32, 0.0, 0.0), &mut objects);
        }

        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        let mut ubo = GlobalUbo::default();
        system().update(&mut frame(&encoder, &camera, &mut objects, 0.0), &mut ubo);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "Point lights exceed maximum")]
    fn test_too_many_lights_fails_assertion() {
        update_too_many_lights();
    }

    #[cfg(not(debug_assertions))]
    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_too_many_lights_panics_on_index() {
        update_too_many_lights();
    }

    #[test]
    fn test_lights_drawn_far_to_near() {
        let mut objects = GameObjectMap::new();
        light_at(Vec3::new(1.0, 0.0, 0.0), &mut objects);
        light_at(Vec3::new(0.0, 0.0, 3.0), &mut objects);
        light_at(Vec3::new(0.0, 2.0, 0.0), &mut objects);

        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        system().render(&frame(&encoder, &camera, &mut objects, 0.0));

        assert_eq!(
            pushed_positions(&encoder),
            vec![[0.0, 0.0, 3.0, 1.0], [0.0, 2.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0]]
        );
        assert_eq!(encoder.count(|c| matches!(c, RecordedCommand::BindPipeline { .. })), 1);
        assert_eq!(encoder.count(|c| matches!(c, RecordedCommand::BindVertexBuffers { .. })), 0);
        assert_eq!(
            encoder.count(|c| matches!(c, RecordedCommand::Draw { vertex_count: 6, instance_count: 1, .. })),
            3
        );
    }

    #[test]
    fn test_equal_distances_keep_every_light() {
        let mut objects = GameObjectMap::new();
        light_at(Vec3::new(2.0, 0.0, 0.0), &mut objects);
        light_at(Vec3::new(-2.0, 0.0, 0.0), &mut objects);
        light_at(Vec3::new(0.0, 0.0, 2.0), &mut objects);

        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        system().render(&frame(&encoder, &camera, &mut objects, 0.0));

        assert_eq!(
            pushed_positions(&encoder),
            vec![[2.0, 0.0, 0.0, 1.0], [-2.0, 0.0, 0.0, 1.0], [0.0, 0.0, 2.0, 1.0]]
        );
    }

    #[test]
    fn test_radius_comes_from_scale() {
        let mut objects = GameObjectMap::new();
        let mut light = GameObject::make_point_light(1.0, 0.35, Vec3::new(1.0, 1.0, 1.0));
        light.transform.translation = Vec3::new(0.0, -1.0, 0.0);
        light.insert_into(&mut objects);

        let encoder = RecordingEncoder::default();
        let camera = Camera::new();
        system().render(&frame(&encoder, &camera, &mut objects, 0.0));

        let push: PointLightPushConstants = bytemuck::pod_read_unaligned(&encoder.push_constant_payloads()[0]);
        assert_relative_eq!(push.radius, 0.35);
        assert_eq!(push.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
