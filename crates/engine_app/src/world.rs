//! World state owned by the frame loop.
//!
//! The [`World`] owns the entity registry, the scene graph and every resource
//! registry. Nothing is global: code that needs a registry borrows it from
//! the world it was handed.

use engine_core::{CoreError, Entity, EntityRegistry, Result};
use engine_resources::{
    CameraManager, LightManager, MaterialRegistry, MeshRegistry, RenderObjectRegistry,
    ShaderRegistry, TextureRegistry,
};
use engine_scene::{Scene, SceneObjectId, TransformUpdateReceiver};
use tracing::debug;

#[derive(Debug, Default)]
pub struct World {
    pub entities: EntityRegistry,
    pub scene: Scene,
    pub meshes: MeshRegistry,
    pub textures: TextureRegistry,
    pub shaders: ShaderRegistry,
    pub materials: MaterialRegistry,
    pub render_objects: RenderObjectRegistry,
    pub cameras: CameraManager,
    pub lights: LightManager,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity with a scene node under the root.
    pub fn spawn(&mut self) -> (Entity, SceneObjectId) {
        let entity = self.entities.create();
        let id = self.scene.add_scene_object(entity);
        (entity, id)
    }

    /// Like [`World::spawn`], also setting the entity's debug name.
    pub fn spawn_named(&mut self, name: impl Into<String>) -> (Entity, SceneObjectId) {
        let (entity, id) = self.spawn();
        self.entities.set_debug_name(entity, name);
        (entity, id)
    }

    /// Destroy an entity together with its scene node and every component
    /// keyed by it. Its children move to its parent.
    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        if !self.entities.is_alive(entity) {
            return Err(CoreError::StaleHandle {
                kind: "entity",
                index: entity.index(),
                generation: u32::from(entity.generation()),
            });
        }

        if let Some(id) = self.scene.lookup(entity) {
            self.scene.remove_scene_object(id)?;
        }
        self.render_objects.remove_entity(entity);
        self.cameras.remove_entity(entity);
        self.lights.remove_entity(entity);

        debug!(name = %self.entities.debug_name_or_fallback(entity), "entity despawned");
        self.entities.destroy(entity);
        Ok(())
    }

    /// Publish this frame's changed world transforms to the render objects,
    /// cameras and lights. Returns the number of entities published.
    pub fn finalize_frame(&mut self) -> usize {
        let mut receivers: [&mut dyn TransformUpdateReceiver; 3] = [
            &mut self.render_objects,
            &mut self.cameras,
            &mut self.lights,
        ];
        self.scene.notify_updated_transforms(&mut receivers)
    }
}
