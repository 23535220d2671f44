//! Entity-keyed component storage.
//!
//! Render objects, cameras and lights belong to one entity each and receive
//! world transforms from the scene by entity. [`EntityTable`] pairs a
//! [`SlotMap`] with an entity index so both lookups stay O(1).

use std::collections::HashMap;

use engine_core::{Entity, Result, SlotId, SlotMap};
use engine_math::Mat4;
use tracing::warn;

/// A value that belongs to exactly one entity.
pub trait EntityOwned {
    fn entity(&self) -> Entity;
}

#[derive(Debug, Clone)]
pub struct EntityTable<T> {
    items: SlotMap<T>,
    by_entity: HashMap<Entity, SlotId<T>>,
}

impl<T: EntityOwned> EntityTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SlotMap::new(),
            by_entity: HashMap::new(),
        }
    }

    /// Store `value` under its entity. An entity that already has a value
    /// keeps it and `value` is dropped.
    pub fn insert(&mut self, value: T) -> SlotId<T> {
        let entity = value.entity();
        if let Some(&existing) = self.by_entity.get(&entity) {
            warn!(
                kind = std::any::type_name::<T>(),
                %entity,
                "entity already has a component of this kind"
            );
            return existing;
        }
        let id = self.items.insert(value);
        self.by_entity.insert(entity, id);
        id
    }

    pub fn remove(&mut self, id: SlotId<T>) -> Result<T> {
        let value = self.items.remove(id)?;
        self.by_entity.remove(&value.entity());
        Ok(value)
    }

    /// Remove whatever value `entity` owns.
    pub fn remove_entity(&mut self, entity: Entity) -> Option<T> {
        let id = self.by_entity.remove(&entity)?;
        self.items.remove(id).ok()
    }

    #[must_use]
    pub fn lookup(&self, entity: Entity) -> Option<SlotId<T>> {
        self.by_entity.get(&entity).copied()
    }

    pub fn get(&self, id: SlotId<T>) -> Result<&T> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: SlotId<T>) -> Result<&mut T> {
        self.items.get_mut(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId<T>, &T)> + '_ {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.by_entity.clear();
    }

    /// Call `apply` for every updated entity this table tracks. Returns how
    /// many values were updated.
    pub fn apply_transforms(
        &mut self,
        entities: &[Entity],
        transforms: &[Mat4],
        mut apply: impl FnMut(&mut T, &Mat4),
    ) -> usize {
        let mut applied = 0;
        for (entity, transform) in entities.iter().zip(transforms) {
            if let Some(&id) = self.by_entity.get(entity)
                && let Ok(value) = self.items.get_mut(id)
            {
                apply(value, transform);
                applied += 1;
            }
        }
        applied
    }
}

impl<T: EntityOwned> Default for EntityTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use engine_core::EntityRegistry;
    use engine_math::Vec3;

    use super::*;

    #[derive(Debug)]
    struct Tag {
        entity: Entity,
        world: Mat4,
    }

    impl EntityOwned for Tag {
        fn entity(&self) -> Entity {
            self.entity
        }
    }

    fn tag(entity: Entity) -> Tag {
        Tag {
            entity,
            world: Mat4::IDENTITY,
        }
    }

    #[test]
    fn test_one_value_per_entity() {
        let mut registry = EntityRegistry::new();
        let entity = registry.create();
        let mut table = EntityTable::new();
        let first = table.insert(tag(entity));
        let second = table.insert(tag(entity));
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(entity), Some(first));
    }

    #[test]
    fn test_remove_clears_entity_index() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        let b = registry.create();
        let mut table = EntityTable::new();
        let id = table.insert(tag(a));
        table.insert(tag(b));

        assert_eq!(table.remove(id).unwrap().entity, a);
        assert_eq!(table.lookup(a), None);
        assert!(table.remove_entity(b).is_some());
        assert!(table.remove_entity(b).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_apply_transforms_skips_unknown_entities() {
        let mut registry = EntityRegistry::new();
        let tracked = registry.create();
        let untracked = registry.create();
        let mut table = EntityTable::new();
        let id = table.insert(tag(tracked));

        let moved = Mat4::from_translation(Vec3::Z);
        let applied = table.apply_transforms(
            &[untracked, tracked],
            &[Mat4::IDENTITY, moved],
            |value, world| value.world = *world,
        );
        assert_eq!(applied, 1);
        assert_eq!(table.get(id).unwrap().world, moved);
    }
}
