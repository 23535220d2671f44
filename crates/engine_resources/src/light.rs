//! Light sources.
//!
//! Lights take their position and orientation from the scene. Everything
//! else (type, color, range) is set directly.

use engine_core::{Entity, Result, SlotId};
use engine_math::{Mat3, Mat4, Vec3};
use engine_scene::TransformUpdateReceiver;
use serde::{Deserialize, Serialize};

use crate::table::{EntityOwned, EntityTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    Directional,
    #[default]
    Point,
    Spot,
}

impl LightType {
    pub const ALL: [Self; 3] = [Self::Directional, Self::Point, Self::Spot];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Point => "point",
            Self::Spot => "spot",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Directional => "Directional",
            Self::Point => "Point",
            Self::Spot => "Spot",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub entity: Entity,
    pub light_type: LightType,
    pub position: Vec3,
    pub orientation: Mat3,
    pub color: Vec3,
    pub radius: f32,
    /// Full cone angle of spot lights, in radians.
    pub spot_angle: f32,
    pub shadow_casting: bool,
}

impl Light {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            light_type: LightType::default(),
            position: Vec3::ZERO,
            orientation: Mat3::IDENTITY,
            color: Vec3::ONE,
            radius: 1.0,
            spot_angle: std::f32::consts::FRAC_PI_4,
            shadow_casting: false,
        }
    }

    /// Direction the light points in: the local -Z axis.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (self.orientation * Vec3::NEG_Z).normalize_or_zero()
    }
}

impl EntityOwned for Light {
    fn entity(&self) -> Entity {
        self.entity
    }
}

pub type LightId = SlotId<Light>;

#[derive(Debug, Default)]
pub struct LightManager {
    lights: EntityTable<Light>,
}

impl LightManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_light(&mut self, entity: Entity) -> LightId {
        self.lights.insert(Light::new(entity))
    }

    pub fn remove_light(&mut self, id: LightId) -> Result<Light> {
        self.lights.remove(id)
    }

    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.lights.remove_entity(entity).is_some()
    }

    #[must_use]
    pub fn lookup(&self, entity: Entity) -> Option<LightId> {
        self.lights.lookup(entity)
    }

    pub fn light(&self, id: LightId) -> Result<&Light> {
        self.lights.get(id)
    }

    pub fn light_mut(&mut self, id: LightId) -> Result<&mut Light> {
        self.lights.get_mut(id)
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = (LightId, &Light)> + '_ {
        self.lights
            .iter()
            .filter(|(_, light)| light.light_type == LightType::Directional)
    }

    /// Point and spot lights whose radius reaches the sphere at `center`.
    pub fn lights_near(&self, center: Vec3, radius: f32) -> impl Iterator<Item = (LightId, &Light)> + '_ {
        self.lights.iter().filter(move |(_, light)| {
            light.light_type != LightType::Directional
                && light.position.distance(center) <= light.radius + radius
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }
}

impl TransformUpdateReceiver for LightManager {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        self.lights.apply_transforms(entities, transforms, |light, world| {
            light.position = world.transform_point3(Vec3::ZERO);
            light.orientation = Mat3::from_mat4(*world);
        });
    }
}
