//! Entity type and the generational entity registry.
//!
//! An [`Entity`] is a packed `u32` identifier with no inherent data: 22 bits
//! of slot index and 8 bits of generation. Every subsystem (scene graph,
//! lights, cameras, render objects) keys its per-object data by entity.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A generation-checked entity identifier.
///
/// Entities are pure identifiers; they carry no data of their own. An entity
/// is alive iff the registry's stored generation for its index equals the
/// generation packed into the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    /// Number of bits used for the slot index.
    pub const INDEX_BITS: u32 = 22;
    /// Number of bits used for the generation counter.
    pub const GENERATION_BITS: u32 = 8;
    /// Largest index an entity can carry.
    pub const MAX_INDEX: u32 = (1 << Self::INDEX_BITS) - 1;

    const INDEX_MASK: u32 = Self::MAX_INDEX;
    const GENERATION_MASK: u32 = (1 << Self::GENERATION_BITS) - 1;

    /// The null entity. Index 0 is reserved and never alive.
    pub const NULL: Entity = Entity(0);

    /// Pack an index and a generation into an entity.
    #[must_use]
    pub const fn new(index: u32, generation: u8) -> Self {
        Self((index & Self::INDEX_MASK) | ((generation as u32) << Self::INDEX_BITS))
    }

    /// Rebuild an entity from its packed representation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the packed representation.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 & Self::INDEX_MASK
    }

    /// Returns the generation.
    #[must_use]
    pub const fn generation(self) -> u8 {
        ((self.0 >> Self::INDEX_BITS) & Self::GENERATION_MASK) as u8
    }

    /// Returns `true` if this entity uses the reserved null index.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index() == 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index(), self.generation())
    }
}

/// Freed indices are held back until the queue is deeper than this, so a
/// recently destroyed index is not handed out again right away.
pub const MINIMUM_FREE_INDICES: usize = 1024;

/// Issues and retires entities.
///
/// Indices are recycled through a FIFO free queue. Destroying an entity bumps
/// the generation stored for its index, so stale copies of the identifier
/// stop being reported alive.
#[derive(Debug)]
pub struct EntityRegistry {
    /// Current generation per index. Index 0 is the reserved null slot.
    generations: Vec<u8>,
    /// Whether each index currently holds a live entity.
    live: Vec<bool>,
    /// Next never-issued index since the last reset.
    range_end: u32,
    /// Retired indices, oldest first.
    free_indices: VecDeque<u32>,
    /// Queue depth that must be exceeded before an index is reused.
    reuse_threshold: usize,
    alive_count: usize,
    debug_names: HashMap<Entity, String>,
}

impl EntityRegistry {
    /// Create a registry with the default reuse threshold
    /// ([`MINIMUM_FREE_INDICES`]).
    #[must_use]
    pub fn new() -> Self {
        Self::with_reuse_threshold(MINIMUM_FREE_INDICES)
    }

    /// Create a registry that reuses an index once more than `threshold`
    /// indices are waiting in the free queue.
    #[must_use]
    pub fn with_reuse_threshold(threshold: usize) -> Self {
        Self {
            generations: vec![0],
            live: vec![false],
            range_end: 1,
            free_indices: VecDeque::new(),
            reuse_threshold: threshold,
            alive_count: 0,
            debug_names: HashMap::new(),
        }
    }

    /// Issue a new entity.
    ///
    /// # Panics
    ///
    /// Panics if all [`Entity::MAX_INDEX`] indices are in use.
    pub fn create(&mut self) -> Entity {
        let recycled = if self.free_indices.len() > self.reuse_threshold {
            self.free_indices.pop_front()
        } else {
            None
        };

        let index = match recycled {
            Some(index) => index,
            None => {
                let index = self.range_end;
                assert!(
                    index <= Entity::MAX_INDEX,
                    "entity index space exhausted ({} indices)",
                    Entity::MAX_INDEX
                );
                // Slots below the old range end survive a reset with their
                // generations intact.
                if index as usize == self.generations.len() {
                    self.generations.push(0);
                    self.live.push(false);
                }
                self.range_end += 1;
                index
            }
        };

        self.live[index as usize] = true;
        self.alive_count += 1;
        Entity::new(index, self.generations[index as usize])
    }

    /// Returns `true` if `entity` was issued by this registry and has not
    /// been destroyed since.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        let index = entity.index() as usize;
        index != 0
            && index < self.generations.len()
            && self.live[index]
            && self.generations[index] == entity.generation()
    }

    /// Retire an entity. Its index becomes eligible for reuse with the next
    /// generation, and any debug name is dropped.
    ///
    /// Destroying an entity that is not alive is a caller bug; it is logged
    /// and otherwise ignored.
    pub fn destroy(&mut self, entity: Entity) {
        if !self.is_alive(entity) {
            warn!(%entity, "destroy called on an entity that is not alive");
            return;
        }

        let index = entity.index() as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.live[index] = false;
        self.alive_count -= 1;
        self.free_indices.push_back(entity.index());
        self.debug_names.remove(&entity);
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive_count
    }

    /// Returns `true` if no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Iterate over live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, &live)| live)
            .map(|(index, _)| Entity::new(index as u32, self.generations[index]))
    }

    /// Forget every entity and debug name. Previously issued entities are
    /// no longer alive afterwards.
    pub fn clear_all(&mut self) {
        debug!(alive = self.alive_count, "clearing entity registry");
        // Bump live generations so identifiers issued before the reset stay dead.
        for (generation, live) in self.generations.iter_mut().zip(self.live.iter_mut()) {
            if *live {
                *generation = generation.wrapping_add(1);
                *live = false;
            }
        }
        self.range_end = 1;
        self.free_indices.clear();
        self.alive_count = 0;
        self.debug_names.clear();
    }

    /// Returns the debug name of an entity, if one was set.
    #[must_use]
    pub fn debug_name(&self, entity: Entity) -> Option<&str> {
        self.debug_names.get(&entity).map(String::as_str)
    }

    /// Returns the debug name, or `"Entity <index>"` when none is set.
    #[must_use]
    pub fn debug_name_or_fallback(&self, entity: Entity) -> Cow<'_, str> {
        match self.debug_name(entity) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("Entity {}", entity.index())),
        }
    }

    /// Set or replace the debug name of a live entity.
    pub fn set_debug_name(&mut self, entity: Entity, name: impl Into<String>) {
        if !self.is_alive(entity) {
            warn!(%entity, "ignoring debug name for an entity that is not alive");
            return;
        }
        self.debug_names.insert(entity, name.into());
    }

    /// Remove the debug name of an entity.
    pub fn clear_debug_name(&mut self, entity: Entity) {
        self.debug_names.remove(&entity);
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
