//! Scene graph storage and hierarchy edits.
//!
//! Nodes live in parallel columns (struct-of-arrays). Row 0 is the permanent
//! root; every other row belongs to exactly one [`Entity`]. Removing a node
//! moves the last row into the hole, so a row index is only meaningful until
//! the next removal. [`SceneObjectId`] therefore carries the entity that owned
//! the row when the id was issued, and every checked call compares it against
//! the row's current owner.
//!
//! Links use `0` as "none": the root is never anyone's sibling or child, so
//! index 0 doubles as the null link. Nodes whose parent is the root are not
//! chained as siblings; [`Scene::root_objects`] finds them by scanning.

use std::collections::HashMap;

use engine_core::{CoreError, Entity, Result};
use engine_math::{EditTransform, Mat4};
use tracing::{debug, trace, warn};

use crate::fanout::UpdatedEntities;

/// Row of the root, and the "no link" value of every link column.
pub(crate) const ROOT: u32 = 0;

const MIN_CAPACITY: usize = 16;

/// Handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneObjectId {
    index: u32,
    entity: Entity,
}

impl SceneObjectId {
    /// The root of the forest. Valid as a parent, never as a node.
    pub const ROOT: Self = Self {
        index: ROOT,
        entity: Entity::NULL,
    };

    /// Returns the row this id pointed at when it was issued.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the entity that owns the node.
    #[must_use]
    pub const fn entity(self) -> Entity {
        self.entity
    }

    /// Returns `true` for [`SceneObjectId::ROOT`].
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.index == ROOT
    }
}

/// Parallel columns, one row per node. Row 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct SceneData {
    pub(crate) entity: Vec<Entity>,
    pub(crate) local: Vec<Mat4>,
    pub(crate) world: Vec<Mat4>,
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) edit: Vec<EditTransform>,
}

impl SceneData {
    fn with_capacity(capacity: usize) -> Self {
        let mut data = Self {
            entity: Vec::with_capacity(capacity),
            local: Vec::with_capacity(capacity),
            world: Vec::with_capacity(capacity),
            parent: Vec::with_capacity(capacity),
            first_child: Vec::with_capacity(capacity),
            next_sibling: Vec::with_capacity(capacity),
            prev_sibling: Vec::with_capacity(capacity),
            edit: Vec::with_capacity(capacity),
        };
        data.push(Entity::NULL);
        data
    }

    fn len(&self) -> usize {
        self.entity.len()
    }

    fn capacity(&self) -> usize {
        self.entity.capacity()
    }

    fn reserve_exact(&mut self, additional: usize) {
        self.entity.reserve_exact(additional);
        self.local.reserve_exact(additional);
        self.world.reserve_exact(additional);
        self.parent.reserve_exact(additional);
        self.first_child.reserve_exact(additional);
        self.next_sibling.reserve_exact(additional);
        self.prev_sibling.reserve_exact(additional);
        self.edit.reserve_exact(additional);
    }

    fn push(&mut self, entity: Entity) {
        self.entity.push(entity);
        self.local.push(Mat4::IDENTITY);
        self.world.push(Mat4::IDENTITY);
        self.parent.push(ROOT);
        self.first_child.push(ROOT);
        self.next_sibling.push(ROOT);
        self.prev_sibling.push(ROOT);
        self.edit.push(EditTransform::IDENTITY);
    }

    fn swap_remove(&mut self, index: usize) {
        self.entity.swap_remove(index);
        self.local.swap_remove(index);
        self.world.swap_remove(index);
        self.parent.swap_remove(index);
        self.first_child.swap_remove(index);
        self.next_sibling.swap_remove(index);
        self.prev_sibling.swap_remove(index);
        self.edit.swap_remove(index);
    }

    fn truncate(&mut self, len: usize) {
        self.entity.truncate(len);
        self.local.truncate(len);
        self.world.truncate(len);
        self.parent.truncate(len);
        self.first_child.truncate(len);
        self.next_sibling.truncate(len);
        self.prev_sibling.truncate(len);
        self.edit.truncate(len);
    }
}

/// An entity-indexed forest of transforms.
///
/// Every transform write recomputes world matrices for the edited node and
/// its subtree immediately and records the affected entities. The recorded
/// set is drained once per frame by [`Scene::notify_updated_transforms`].
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) data: SceneData,
    pub(crate) entity_map: HashMap<Entity, u32>,
    pub(crate) updated: UpdatedEntities,
    pub(crate) batch_entities: Vec<Entity>,
    pub(crate) batch_transforms: Vec<Mat4>,
    propagation_stack: Vec<u32>,
}

impl Scene {
    /// Create a scene holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Create a scene with room for `capacity` nodes before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: SceneData::with_capacity(capacity.max(1) + 1),
            entity_map: HashMap::with_capacity(capacity),
            updated: UpdatedEntities::default(),
            batch_entities: Vec::new(),
            batch_transforms: Vec::new(),
            propagation_stack: Vec::new(),
        }
    }

    /// Returns the number of nodes, not counting the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    /// Returns `true` if the scene holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow to the next power of two that fits `additional` more rows.
    fn reserve(&mut self, additional: usize) {
        let required = self.data.len() + additional;
        let capacity = self.data.capacity();
        if required <= capacity {
            return;
        }
        let new_capacity = required.next_power_of_two().max(MIN_CAPACITY);
        self.data.reserve_exact(new_capacity - self.data.len());
        debug!(old_capacity = capacity, new_capacity, "scene storage grew");
    }

    fn id_at(&self, index: u32) -> SceneObjectId {
        SceneObjectId {
            index,
            entity: self.data.entity[index as usize],
        }
    }

    fn stale(id: SceneObjectId) -> CoreError {
        CoreError::StaleHandle {
            kind: "scene object",
            index: id.index,
            generation: u32::from(id.entity.generation()),
        }
    }

    /// Row of `id`, accepting the root.
    fn row(&self, id: SceneObjectId) -> Result<usize> {
        let index = id.index as usize;
        if index < self.data.len() && self.data.entity[index] == id.entity {
            Ok(index)
        } else {
            Err(Self::stale(id))
        }
    }

    /// Row of `id`, rejecting the root.
    fn node_row(&self, id: SceneObjectId) -> Result<usize> {
        if id.is_root() {
            return Err(Self::stale(id));
        }
        self.row(id)
    }

    /// Attach a node for `entity` under the root with identity transforms.
    ///
    /// Attaching an entity twice returns the existing node. The null entity
    /// cannot be attached; it yields [`SceneObjectId::ROOT`], which every
    /// node operation rejects.
    pub fn add_scene_object(&mut self, entity: Entity) -> SceneObjectId {
        if entity.is_null() {
            warn!("refusing to attach the null entity");
            return SceneObjectId::ROOT;
        }
        if let Some(&index) = self.entity_map.get(&entity) {
            warn!(%entity, index, "entity already has a scene object");
            return self.id_at(index);
        }

        self.reserve(1);
        let index = self.data.len() as u32;
        self.data.push(entity);
        self.entity_map.insert(entity, index);
        self.updated.insert(entity);
        trace!(%entity, index, "scene object added");

        SceneObjectId { index, entity }
    }

    /// Attach nodes for several entities at once. Ids are returned in input
    /// order.
    pub fn add_scene_objects(&mut self, entities: &[Entity]) -> Vec<SceneObjectId> {
        self.reserve(entities.len());
        entities
            .iter()
            .map(|&entity| self.add_scene_object(entity))
            .collect()
    }

    /// Detach a node.
    ///
    /// Its children move to its parent (and are recomputed against it). The
    /// last row then moves into the freed row, which invalidates the moved
    /// node's previously issued id.
    pub fn remove_scene_object(&mut self, id: SceneObjectId) -> Result<()> {
        let index = self.node_row(id)?;
        let row = index as u32;
        let former_parent = self.data.parent[index];

        self.unlink(row);

        let mut child = self.data.first_child[index];
        self.data.first_child[index] = ROOT;
        while child != ROOT {
            let next = self.data.next_sibling[child as usize];
            self.data.prev_sibling[child as usize] = ROOT;
            self.data.next_sibling[child as usize] = ROOT;
            self.link(child, former_parent);
            self.update_world_transforms(child as usize);
            child = next;
        }

        self.entity_map.remove(&id.entity);
        self.updated.remove(id.entity);

        let last = self.data.len() - 1;
        if index != last {
            let parent = self.data.parent[last];
            let prev = self.data.prev_sibling[last];
            let next = self.data.next_sibling[last];

            if prev != ROOT {
                self.data.next_sibling[prev as usize] = row;
            } else if parent != ROOT {
                self.data.first_child[parent as usize] = row;
            }
            if next != ROOT {
                self.data.prev_sibling[next as usize] = row;
            }
            let mut child = self.data.first_child[last];
            while child != ROOT {
                self.data.parent[child as usize] = row;
                child = self.data.next_sibling[child as usize];
            }

            self.entity_map.insert(self.data.entity[last], row);
        }
        self.data.swap_remove(index);

        trace!(entity = %id.entity, index, "scene object removed");
        Ok(())
    }

    /// Remove every node, keeping the root and the allocated storage.
    pub fn clear(&mut self) {
        self.data.truncate(1);
        self.data.first_child[0] = ROOT;
        self.entity_map.clear();
        self.updated.clear();
        debug!("scene cleared");
    }

    /// Returns the node attached to `entity`, if any.
    #[must_use]
    pub fn lookup(&self, entity: Entity) -> Option<SceneObjectId> {
        self.entity_map.get(&entity).map(|&index| self.id_at(index))
    }

    /// Like [`Scene::lookup`], reporting a missing node as an error.
    pub fn resolve(&self, entity: Entity) -> Result<SceneObjectId> {
        self.lookup(entity)
            .ok_or(CoreError::NotAttached { entity })
    }

    /// Returns `true` if `id` still names a live node.
    #[must_use]
    pub fn contains(&self, id: SceneObjectId) -> bool {
        self.node_row(id).is_ok()
    }

    /// Iterate over all nodes in storage order.
    pub fn iter(&self) -> impl Iterator<Item = SceneObjectId> + '_ {
        (1..self.data.len() as u32).map(|index| self.id_at(index))
    }

    /// Iterate over nodes whose parent is the root.
    pub fn root_objects(&self) -> impl Iterator<Item = SceneObjectId> + '_ {
        (1..self.data.len() as u32)
            .filter(|&index| self.data.parent[index as usize] == ROOT)
            .map(|index| self.id_at(index))
    }

    fn link_at(&self, link: u32) -> Option<SceneObjectId> {
        (link != ROOT).then(|| self.id_at(link))
    }

    /// Returns the node's parent, or `None` at the top level.
    pub fn parent(&self, id: SceneObjectId) -> Result<Option<SceneObjectId>> {
        let index = self.node_row(id)?;
        Ok(self.link_at(self.data.parent[index]))
    }

    /// Returns the most recently attached child.
    pub fn first_child(&self, id: SceneObjectId) -> Result<Option<SceneObjectId>> {
        let index = self.node_row(id)?;
        Ok(self.link_at(self.data.first_child[index]))
    }

    pub fn next_sibling(&self, id: SceneObjectId) -> Result<Option<SceneObjectId>> {
        let index = self.node_row(id)?;
        Ok(self.link_at(self.data.next_sibling[index]))
    }

    pub fn prev_sibling(&self, id: SceneObjectId) -> Result<Option<SceneObjectId>> {
        let index = self.node_row(id)?;
        Ok(self.link_at(self.data.prev_sibling[index]))
    }

    /// Iterate over a node's direct children, newest first.
    pub fn children(&self, id: SceneObjectId) -> Result<Children<'_>> {
        let index = self.node_row(id)?;
        Ok(Children {
            scene: self,
            current: self.data.first_child[index],
        })
    }

    /// Returns `true` if `ancestor` lies on the parent chain of `node`.
    fn is_ancestor(&self, ancestor: u32, node: u32) -> bool {
        let mut current = self.data.parent[node as usize];
        while current != ROOT {
            if current == ancestor {
                return true;
            }
            current = self.data.parent[current as usize];
        }
        false
    }

    /// Move `id` under `parent` as its first child. Passing
    /// [`SceneObjectId::ROOT`] makes it a top-level node.
    pub fn set_parent(&mut self, id: SceneObjectId, parent: SceneObjectId) -> Result<()> {
        let index = self.node_row(id)?;
        let parent_index = self.row(parent)?;
        let row = index as u32;
        let parent_row = parent_index as u32;

        if self.data.parent[index] == parent_row {
            return Ok(());
        }
        if parent_row == row || self.is_ancestor(row, parent_row) {
            return Err(CoreError::InvalidHierarchy {
                child: id.entity,
                parent: parent.entity,
            });
        }

        self.unlink(row);
        self.link(row, parent_row);
        self.update_world_transforms(index);
        Ok(())
    }

    /// Take `row` out of its sibling chain and detach it from its parent.
    /// Children stay attached.
    fn unlink(&mut self, row: u32) {
        let index = row as usize;
        let parent = self.data.parent[index];
        let prev = self.data.prev_sibling[index];
        let next = self.data.next_sibling[index];

        if prev != ROOT {
            self.data.next_sibling[prev as usize] = next;
        } else if parent != ROOT {
            self.data.first_child[parent as usize] = next;
        }
        if next != ROOT {
            self.data.prev_sibling[next as usize] = prev;
        }

        self.data.prev_sibling[index] = ROOT;
        self.data.next_sibling[index] = ROOT;
        self.data.parent[index] = ROOT;
    }

    /// Make an unlinked `row` the first child of `parent`.
    fn link(&mut self, row: u32, parent: u32) {
        self.data.parent[row as usize] = parent;
        if parent == ROOT {
            return;
        }
        let head = self.data.first_child[parent as usize];
        if head != ROOT {
            self.data.prev_sibling[head as usize] = row;
            self.data.next_sibling[row as usize] = head;
        }
        self.data.first_child[parent as usize] = row;
    }

    /// Returns the node's local transform.
    pub fn local_transform(&self, id: SceneObjectId) -> Result<Mat4> {
        let index = self.node_row(id)?;
        Ok(self.data.local[index])
    }

    /// Returns the node's world transform.
    pub fn world_transform(&self, id: SceneObjectId) -> Result<Mat4> {
        let index = self.node_row(id)?;
        Ok(self.data.world[index])
    }

    /// Returns the world transform at `id`'s row without checking ownership.
    ///
    /// # Panics
    ///
    /// Panics if the row is out of range.
    #[must_use]
    pub fn world_transform_unchecked(&self, id: SceneObjectId) -> Mat4 {
        self.data.world[id.index as usize]
    }

    /// Write a local transform and propagate it to the subtree.
    pub fn set_local_transform(&mut self, id: SceneObjectId, local: Mat4) -> Result<()> {
        let index = self.node_row(id)?;
        self.data.local[index] = local;
        self.update_world_transforms(index);
        Ok(())
    }

    /// [`Scene::set_local_transform`] without the ownership check.
    ///
    /// # Panics
    ///
    /// Panics if the row is out of range.
    pub fn set_local_transform_unchecked(&mut self, id: SceneObjectId, local: Mat4) {
        let index = id.index as usize;
        self.data.local[index] = local;
        self.update_world_transforms(index);
    }

    /// Returns the editable transform last stored for the node.
    pub fn edit_transform(&self, id: SceneObjectId) -> Result<EditTransform> {
        let index = self.node_row(id)?;
        Ok(self.data.edit[index])
    }

    /// Store `edit` and use its matrix as the local transform.
    pub fn set_edit_transform(&mut self, id: SceneObjectId, edit: EditTransform) -> Result<()> {
        let index = self.node_row(id)?;
        self.data.edit[index] = edit;
        self.data.local[index] = edit.to_matrix();
        self.update_world_transforms(index);
        Ok(())
    }

    /// Store a local matrix together with the edit values it came from,
    /// without rebuilding the matrix.
    pub fn set_local_and_edit_transform(
        &mut self,
        id: SceneObjectId,
        local: Mat4,
        edit: EditTransform,
    ) -> Result<()> {
        let index = self.node_row(id)?;
        self.data.edit[index] = edit;
        self.data.local[index] = local;
        self.update_world_transforms(index);
        Ok(())
    }

    /// Queue the node for the next fan-out without touching its transform.
    /// Children are not queued.
    pub fn mark_updated(&mut self, id: SceneObjectId) -> Result<()> {
        self.node_row(id)?;
        self.updated.insert(id.entity);
        Ok(())
    }

    /// Entities queued for the next fan-out, sorted.
    #[must_use]
    pub fn updated_entities(&self) -> &[Entity] {
        self.updated.as_slice()
    }

    /// Recompute the world transform of every node.
    pub fn update_all_world_transforms(&mut self) {
        for index in 1..self.data.len() {
            if self.data.parent[index] == ROOT {
                self.update_world_transforms(index);
            }
        }
    }

    /// Recompute `index` from its parent, then its whole subtree, parents
    /// before children. Every visited entity is queued for fan-out.
    fn update_world_transforms(&mut self, index: usize) {
        let data = &mut self.data;
        let stack = &mut self.propagation_stack;
        stack.clear();
        stack.push(index as u32);

        while let Some(row) = stack.pop() {
            let row = row as usize;
            // Row 0 keeps an identity world transform.
            let parent = data.parent[row] as usize;
            data.world[row] = data.world[parent] * data.local[row];
            self.updated.insert(data.entity[row]);

            let mut child = data.first_child[row];
            while child != ROOT {
                stack.push(child);
                child = data.next_sibling[child as usize];
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's direct children. See [`Scene::children`].
#[derive(Debug, Clone)]
pub struct Children<'a> {
    scene: &'a Scene,
    current: u32,
}

impl Iterator for Children<'_> {
    type Item = SceneObjectId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == ROOT {
            return None;
        }
        let id = self.scene.id_at(self.current);
        self.current = self.scene.data.next_sibling[self.current as usize];
        Some(id)
    }
}
