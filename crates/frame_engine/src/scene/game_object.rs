//! Scene objects and their shared id space

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::foundation::math::{Transform, Vec3};
use crate::render::Model;

/// Unique identifier of a [`GameObject`]
pub type GameObjectId = u32;

/// Live scene objects keyed by id.
///
/// Ids are handed out in increasing order, so iteration follows insertion order.
pub type GameObjectMap = BTreeMap<GameObjectId, GameObject>;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Point-light component; the light radius is the object's `scale.x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightComponent {
    /// Multiplier applied to the light color
    pub light_intensity: f32,
}

/// An object in the scene: a shared mesh, a point light, or neither
pub struct GameObject {
    id: GameObjectId,
    /// Mesh drawn by the mesh pass
    pub model: Option<Arc<dyn Model>>,
    /// Base color; also the light color for point lights
    pub color: Vec3,
    /// Placement in the world
    pub transform: Transform,
    /// Makes the object a point light
    pub point_light: Option<PointLightComponent>,
}

impl GameObject {
    /// Create an empty object with a fresh id
    pub fn create() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            model: None,
            color: Vec3::zeros(),
            transform: Transform::default(),
            point_light: None,
        }
    }

    /// Create a point light of the given intensity, radius and color
    pub fn make_point_light(intensity: f32, radius: f32, color: Vec3) -> Self {
        let mut object = Self::create();
        object.color = color;
        object.transform.scale.x = radius;
        object.point_light = Some(PointLightComponent {
            light_intensity: intensity,
        });
        object
    }

    /// Unique id
    pub fn id(&self) -> GameObjectId {
        self.id
    }

    /// Insert into `objects` under this object's id
    pub fn insert_into(self, objects: &mut GameObjectMap) -> GameObjectId {
        let id = self.id;
        objects.insert(id, self);
        id
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("has_model", &self.model.is_some())
            .field("color", &self.color)
            .field("transform", &self.transform)
            .field("point_light", &self.point_light)
            .finish()
    }
}
