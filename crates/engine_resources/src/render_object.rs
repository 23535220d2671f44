//! Drawable instances.
//!
//! A render object ties an entity to the mesh and material it is drawn with
//! and caches the entity's world transform from scene fan-out.

use engine_core::{Entity, Result, SlotId};
use engine_math::Mat4;
use engine_scene::TransformUpdateReceiver;
use tracing::trace;

use crate::material::MaterialId;
use crate::mesh::MeshId;
use crate::table::{EntityOwned, EntityTable};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    pub entity: Entity,
    pub mesh: Option<MeshId>,
    pub material: Option<MaterialId>,
    pub world: Mat4,
}

impl RenderObject {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            mesh: None,
            material: None,
            world: Mat4::IDENTITY,
        }
    }
}

impl EntityOwned for RenderObject {
    fn entity(&self) -> Entity {
        self.entity
    }
}

pub type RenderObjectId = SlotId<RenderObject>;

#[derive(Debug, Default)]
pub struct RenderObjectRegistry {
    objects: EntityTable<RenderObject>,
}

impl RenderObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_render_object(&mut self, entity: Entity) -> RenderObjectId {
        self.objects.insert(RenderObject::new(entity))
    }

    pub fn remove_render_object(&mut self, id: RenderObjectId) -> Result<RenderObject> {
        self.objects.remove(id)
    }

    /// Remove the entity's render object, if it has one.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.objects.remove_entity(entity).is_some()
    }

    #[must_use]
    pub fn lookup(&self, entity: Entity) -> Option<RenderObjectId> {
        self.objects.lookup(entity)
    }

    pub fn render_object(&self, id: RenderObjectId) -> Result<&RenderObject> {
        self.objects.get(id)
    }

    pub fn set_mesh(&mut self, id: RenderObjectId, mesh: MeshId) -> Result<()> {
        self.objects.get_mut(id)?.mesh = Some(mesh);
        Ok(())
    }

    pub fn set_material(&mut self, id: RenderObjectId, material: MaterialId) -> Result<()> {
        self.objects.get_mut(id)?.material = Some(material);
        Ok(())
    }

    /// Objects with both a mesh and a material assigned.
    pub fn drawable(&self) -> impl Iterator<Item = &RenderObject> + '_ {
        self.objects
            .iter()
            .map(|(_, object)| object)
            .filter(|object| object.mesh.is_some() && object.material.is_some())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl TransformUpdateReceiver for RenderObjectRegistry {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        let applied = self
            .objects
            .apply_transforms(entities, transforms, |object, world| object.world = *world);
        trace!(applied, "render objects updated");
    }
}
