//! Scene objects and CPU-side mesh data

mod game_object;
mod mesh_data;

pub use game_object::{GameObject, GameObjectId, GameObjectMap, PointLightComponent};
pub use mesh_data::{MeshData, Vertex};
