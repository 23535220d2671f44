//! Cameras and the active-camera selection.

use engine_core::{CoreError, Entity, Result, SlotId};
use engine_math::Mat4;
use engine_scene::TransformUpdateReceiver;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{EntityOwned, EntityTable};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        /// Width over height.
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        /// Height of the view volume.
        height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Perspective { .. } => "perspective",
            Self::Orthographic { .. } => "orthographic",
        }
    }

    /// Right-handed projection matrix with a [0, 1] depth range.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Self::Orthographic {
                height,
                aspect,
                near,
                far,
            } => {
                let half_h = height * 0.5;
                let half_w = half_h * aspect;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, near, far)
            }
        }
    }

    #[must_use]
    pub fn with_aspect(mut self, new_aspect: f32) -> Self {
        match &mut self {
            Self::Perspective { aspect, .. } | Self::Orthographic { aspect, .. } => {
                *aspect = new_aspect;
            }
        }
        self
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: 1.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub entity: Entity,
    pub projection: Projection,
    /// Camera-to-world transform from the scene.
    pub world: Mat4,
    /// Inverse of `world`.
    pub view: Mat4,
}

impl Camera {
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.view
    }
}

impl EntityOwned for Camera {
    fn entity(&self) -> Entity {
        self.entity
    }
}

pub type CameraId = SlotId<Camera>;

/// Cameras keyed by entity. The first camera added becomes active.
#[derive(Debug, Default)]
pub struct CameraManager {
    cameras: EntityTable<Camera>,
    active: Option<Entity>,
}

impl CameraManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_camera(&mut self, entity: Entity) -> CameraId {
        let id = self.cameras.insert(Camera {
            entity,
            projection: Projection::default(),
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        });
        if self.active.is_none() {
            self.active = Some(entity);
        }
        id
    }

    pub fn remove_camera(&mut self, id: CameraId) -> Result<Camera> {
        let camera = self.cameras.remove(id)?;
        self.on_removed(camera.entity);
        Ok(camera)
    }

    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        let removed = self.cameras.remove_entity(entity).is_some();
        if removed {
            self.on_removed(entity);
        }
        removed
    }

    fn on_removed(&mut self, entity: Entity) {
        if self.active == Some(entity) {
            self.active = self.cameras.iter().next().map(|(_, camera)| camera.entity);
            debug!(removed = %entity, active = ?self.active, "active camera removed");
        }
    }

    #[must_use]
    pub fn lookup(&self, entity: Entity) -> Option<CameraId> {
        self.cameras.lookup(entity)
    }

    pub fn camera(&self, id: CameraId) -> Result<&Camera> {
        self.cameras.get(id)
    }

    pub fn set_projection(&mut self, id: CameraId, projection: Projection) -> Result<()> {
        self.cameras.get_mut(id)?.projection = projection;
        Ok(())
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<&Camera> {
        let id = self.cameras.lookup(self.active?)?;
        self.cameras.get(id).ok()
    }

    /// Make `entity`'s camera the active one.
    pub fn set_active_camera(&mut self, entity: Entity) -> Result<()> {
        if self.cameras.lookup(entity).is_none() {
            return Err(CoreError::NotAttached { entity });
        }
        self.active = Some(entity);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn clear(&mut self) {
        self.cameras.clear();
        self.active = None;
    }
}

impl TransformUpdateReceiver for CameraManager {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        self.cameras.apply_transforms(entities, transforms, |camera, world| {
            camera.world = *world;
            camera.view = world.inverse();
        });
    }
}
