//! Demo scene: two vases on a floor quad and a ring of colored point lights

use std::f32::consts::TAU;
use std::sync::Arc;

use frame_engine::foundation::math::{rotate_about_axis, Vec3};
use frame_engine::render::vulkan::{VulkanContext, VulkanModel};
use frame_engine::render::{Model, RenderResult};
use frame_engine::scene::{GameObject, GameObjectMap, MeshData};

const MODEL_DIR: &str = "resources/models";

const LIGHT_COLORS: [[f32; 3]; 6] = [
    [1.0, 0.1, 0.1],
    [0.1, 0.1, 1.0],
    [0.1, 1.0, 0.1],
    [1.0, 1.0, 0.1],
    [0.1, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

const LIGHT_INTENSITY: f32 = 0.2;
const LIGHT_RADIUS: f32 = 0.1;

fn load_model(context: &VulkanContext, file_name: &str, fallback: fn() -> MeshData) -> RenderResult<Arc<dyn Model>> {
    let mesh = MeshData::from_obj_or(format!("{MODEL_DIR}/{file_name}"), fallback);
    Ok(Arc::new(VulkanModel::from_mesh_data(context, &mesh)?))
}

fn floor_quad() -> MeshData {
    MeshData::quad([0.6, 0.6, 0.6])
}

/// Build the scene objects
pub fn load_game_objects(context: &VulkanContext) -> RenderResult<GameObjectMap> {
    let mut game_objects = GameObjectMap::new();

    let mut flat_vase = GameObject::create();
    flat_vase.model = Some(load_model(context, "flat_vase.obj", MeshData::cube)?);
    flat_vase.transform.translation = Vec3::new(-0.5, 0.5, 0.0);
    flat_vase.transform.scale = Vec3::new(3.0, 1.5, 3.0);
    flat_vase.insert_into(&mut game_objects);

    let mut smooth_vase = GameObject::create();
    smooth_vase.model = Some(load_model(context, "smooth_vase.obj", MeshData::cube)?);
    smooth_vase.transform.translation = Vec3::new(0.5, 0.5, 0.0);
    smooth_vase.transform.scale = Vec3::new(3.0, 1.5, 3.0);
    smooth_vase.insert_into(&mut game_objects);

    let mut floor = GameObject::create();
    floor.model = Some(load_model(context, "quad.obj", floor_quad)?);
    floor.transform.translation = Vec3::new(0.0, 0.5, 0.0);
    floor.transform.scale = Vec3::new(3.0, 1.0, 3.0);
    floor.insert_into(&mut game_objects);

    let axis = Vec3::new(0.0, -1.0, 0.0);
    for (i, color) in LIGHT_COLORS.iter().enumerate() {
        let mut light = GameObject::make_point_light(LIGHT_INTENSITY, LIGHT_RADIUS, Vec3::from(*color));
        let angle = i as f32 * TAU / LIGHT_COLORS.len() as f32;
        light.transform.translation = rotate_about_axis(Vec3::new(-1.0, -1.0, -1.0), axis, angle);
        light.insert_into(&mut game_objects);
    }

    log::info!("Scene loaded with {} objects", game_objects.len());
    Ok(game_objects)
}
