//! Batched publication of changed world transforms.
//!
//! Every transform write records the affected entities in an
//! [`UpdatedEntities`] set. Once per frame [`Scene::notify_updated_transforms`]
//! resolves the set into `(Entity, Mat4)` pairs and hands the whole batch to
//! each receiver in a single call.

use engine_core::Entity;
use engine_math::Mat4;
use tracing::{debug, warn};

use crate::scene::Scene;

/// A subsystem that mirrors world transforms of the entities it cares about.
///
/// `entities` and `transforms` are parallel slices of equal length. Each
/// entity appears at most once per call. Receivers typically look each
/// entity up in their own storage and ignore the ones they do not track.
pub trait TransformUpdateReceiver {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]);
}

/// Sorted set of entities with insert-unique semantics.
#[derive(Debug, Clone, Default)]
pub struct UpdatedEntities {
    entities: Vec<Entity>,
}

impl UpdatedEntities {
    /// Insert `entity`. Returns `false` if it was already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        match self.entities.binary_search(&entity) {
            Ok(_) => false,
            Err(position) => {
                self.entities.insert(position, entity);
                true
            }
        }
    }

    /// Remove `entity`. Returns `false` if it was not present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.entities.binary_search(&entity) {
            Ok(position) => {
                self.entities.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.binary_search(&entity).is_ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Scene {
    /// Publish every world transform that changed since the last call.
    ///
    /// Each receiver is called once with the full batch, in slice order.
    /// Nothing is called when the batch is empty. The queue is empty
    /// afterwards. Returns the number of entities published.
    pub fn notify_updated_transforms(
        &mut self,
        receivers: &mut [&mut dyn TransformUpdateReceiver],
    ) -> usize {
        self.batch_entities.clear();
        self.batch_transforms.clear();

        for &entity in self.updated.as_slice() {
            match self.entity_map.get(&entity) {
                Some(&index) => {
                    self.batch_entities.push(entity);
                    self.batch_transforms.push(self.data.world[index as usize]);
                }
                None => warn!(%entity, "updated entity has no scene object"),
            }
        }

        let count = self.batch_entities.len();
        if count > 0 {
            for receiver in receivers.iter_mut() {
                receiver.notify_updated_transforms(&self.batch_entities, &self.batch_transforms);
            }
        }
        debug!(count, receivers = receivers.len(), "published transform updates");

        self.updated.clear();
        self.batch_entities.clear();
        self.batch_transforms.clear();
        count
    }
}
