//! Generational slot map.
//!
//! A [`SlotMap`] stores values in a contiguous buffer and hands out
//! [`SlotId`]s: a slot index plus the generation stamped into that slot when
//! the value was added. Removal leaves a hole that is threaded onto an
//! intrusive free list and reused by a later add, always with a fresh
//! generation, so ids held across a removal are detected as stale instead of
//! aliasing the new occupant.
//!
//! ## Growth
//!
//! The buffer never shrinks. When an add finds it full, capacity doubles.
//! Growth moves values, so references obtained from [`SlotMap::get`] must not
//! be held across an add; ids stay valid.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use tracing::debug;

use crate::error::{CoreError, Result};

/// Initial capacity of [`SlotMap::new`].
pub const DEFAULT_CAPACITY: usize = 64;

/// Marks the end of the free list.
const FREE_LIST_END: u32 = u32::MAX;

/// Generation stored in vacant slots. No issued id ever carries it.
const INVALID_GENERATION: u32 = u32::MAX;

/// A lookup key into a [`SlotMap<T>`].
///
/// Ids own nothing. They are plain `Copy` values that stay comparable and
/// hashable after the value they named has been removed.
pub struct SlotId<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SlotId<T> {
    /// An id that never resolves.
    pub const INVALID: Self = Self::new(u32::MAX, INVALID_GENERATION);

    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation stamped when the value was added.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

// Manual impls: derives would require `T` to implement the traits as well.

impl<T> Clone for SlotId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotId<T> {}

impl<T> PartialEq for SlotId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for SlotId<T> {}

impl<T> Hash for SlotId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for SlotId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Occupied(T),
    Vacant { next_free: u32 },
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    entry: Entry<T>,
}

/// Pool container with O(1) add/remove and generation-checked ids.
#[derive(Debug, Clone)]
pub struct SlotMap<T> {
    slots: Vec<Slot<T>>,
    /// Index of the most recently freed slot, or [`FREE_LIST_END`].
    free_head: u32,
    /// Generation handed to the next added value.
    next_generation: u32,
    len: usize,
}

impl<T> SlotMap<T> {
    /// Create an empty map with [`DEFAULT_CAPACITY`] slots reserved.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty map with room for `capacity` values before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: FREE_LIST_END,
            next_generation: 0,
            len: 0,
        }
    }

    /// Add a default-constructed value and return its id together with a
    /// mutable reference for in-place initialisation.
    pub fn add(&mut self) -> (SlotId<T>, &mut T)
    where
        T: Default,
    {
        self.insert_slot(T::default())
    }

    /// Add `value` and return its id.
    pub fn insert(&mut self, value: T) -> SlotId<T> {
        self.insert_slot(value).0
    }

    fn insert_slot(&mut self, value: T) -> (SlotId<T>, &mut T) {
        let generation = self.take_generation();

        let index = if self.free_head == FREE_LIST_END {
            if self.slots.len() == self.slots.capacity() {
                self.grow();
            }
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation,
                entry: Entry::Occupied(value),
            });
            index
        } else {
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            let Entry::Vacant { next_free } = slot.entry else {
                unreachable!("free list points at occupied slot {index}");
            };
            self.free_head = next_free;
            slot.generation = generation;
            slot.entry = Entry::Occupied(value);
            index
        };

        self.len += 1;
        let Entry::Occupied(value) = &mut self.slots[index as usize].entry else {
            unreachable!("slot {index} was just filled");
        };
        (SlotId::new(index, generation), value)
    }

    fn take_generation(&mut self) -> u32 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        if self.next_generation == INVALID_GENERATION {
            self.next_generation = 0;
        }
        generation
    }

    fn grow(&mut self) {
        let old_capacity = self.slots.capacity();
        let new_capacity = (old_capacity * 2).max(DEFAULT_CAPACITY);
        self.slots.reserve_exact(new_capacity - self.slots.len());
        debug!(
            kind = std::any::type_name::<T>(),
            old_capacity,
            new_capacity = self.slots.capacity(),
            "slot map grew"
        );
    }

    fn stale(id: SlotId<T>) -> CoreError {
        CoreError::StaleHandle {
            kind: std::any::type_name::<T>(),
            index: id.index,
            generation: id.generation,
        }
    }

    /// Returns `true` if `id` names a live value.
    #[must_use]
    pub fn has(&self, id: SlotId<T>) -> bool {
        self.slots.get(id.index as usize).is_some_and(|slot| {
            slot.generation == id.generation && matches!(slot.entry, Entry::Occupied(_))
        })
    }

    /// Returns the value named by `id`.
    pub fn get(&self, id: SlotId<T>) -> Result<&T> {
        match self.slots.get(id.index as usize) {
            Some(Slot {
                generation,
                entry: Entry::Occupied(value),
            }) if *generation == id.generation => Ok(value),
            _ => Err(Self::stale(id)),
        }
    }

    /// Returns the value named by `id` mutably.
    pub fn get_mut(&mut self, id: SlotId<T>) -> Result<&mut T> {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot {
                generation,
                entry: Entry::Occupied(value),
            }) if *generation == id.generation => Ok(value),
            _ => Err(Self::stale(id)),
        }
    }

    /// Returns the value at `id`'s slot without comparing generations.
    ///
    /// For hot loops that validated `id` earlier in the same frame. A
    /// recycled slot silently yields the new occupant.
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of range or vacant.
    #[must_use]
    pub fn get_unchecked(&self, id: SlotId<T>) -> &T {
        match &self.slots[id.index as usize].entry {
            Entry::Occupied(value) => value,
            Entry::Vacant { .. } => panic!("slot {} is vacant", id.index),
        }
    }

    /// Mutable counterpart of [`SlotMap::get_unchecked`].
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of range or vacant.
    pub fn get_unchecked_mut(&mut self, id: SlotId<T>) -> &mut T {
        match &mut self.slots[id.index as usize].entry {
            Entry::Occupied(value) => value,
            Entry::Vacant { .. } => panic!("slot {} is vacant", id.index),
        }
    }

    /// Remove the value named by `id` and return it. The slot goes to the
    /// head of the free list.
    pub fn remove(&mut self, id: SlotId<T>) -> Result<T> {
        if !self.has(id) {
            return Err(Self::stale(id));
        }

        let slot = &mut self.slots[id.index as usize];
        slot.generation = INVALID_GENERATION;
        let old = std::mem::replace(
            &mut slot.entry,
            Entry::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = id.index;
        self.len -= 1;

        match old {
            Entry::Occupied(value) => Ok(value),
            Entry::Vacant { .. } => unreachable!("slot {} passed the liveness check", id.index),
        }
    }

    /// Remove every value. All outstanding ids become stale; storage is kept.
    pub fn clear(&mut self) {
        self.free_head = FREE_LIST_END;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            slot.generation = INVALID_GENERATION;
            slot.entry = Entry::Vacant {
                next_free: self.free_head,
            };
            self.free_head = index as u32;
        }
        self.len = 0;
    }

    /// Returns the number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no live values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots that fit before the next growth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Iterate over live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId<T>, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.entry {
                Entry::Occupied(value) => Some((SlotId::new(index as u32, slot.generation), value)),
                Entry::Vacant { .. } => None,
            })
    }

    /// Iterate mutably over live values in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId<T>, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| match &mut slot.entry {
                Entry::Occupied(value) => Some((SlotId::new(index as u32, slot.generation), value)),
                Entry::Vacant { .. } => None,
            })
    }
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};

    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Texture {
        width: u32,
        height: u32,
    }

    #[test]
    fn test_add_default_constructs() {
        let mut map: SlotMap<Texture> = SlotMap::new();
        let (id, texture) = map.add();
        assert_eq!(*texture, Texture::default());
        texture.width = 256;
        assert!(map.has(id));
        assert_eq!(map.get(id).unwrap().width, 256);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_makes_id_stale() {
        let mut map: SlotMap<Texture> = SlotMap::new();
        let id = map.insert(Texture { width: 4, height: 4 });
        let removed = map.remove(id).unwrap();
        assert_eq!(removed.width, 4);
        assert!(!map.has(id));
        assert!(matches!(map.get(id), Err(CoreError::StaleHandle { .. })));
        assert!(map.get_mut(id).is_err());
        assert!(map.remove(id).is_err());
        assert!(map.is_empty());
    }

    #[test]
    fn test_free_list_reuses_index_with_new_generation() {
        let mut map: SlotMap<Texture> = SlotMap::new();
        let _a = map.insert(Texture::default());
        let b = map.insert(Texture::default());
        map.remove(b).unwrap();

        let c = map.insert(Texture::default());
        assert_eq!(c.index(), b.index());
        assert_ne!(c.generation(), b.generation());
        assert_ne!(c, b);
        assert!(!map.has(b));
        assert!(map.has(c));
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut map: SlotMap<u32> = SlotMap::new();
        let ids: Vec<_> = (0..4).map(|v| map.insert(v)).collect();
        map.remove(ids[1]).unwrap();
        map.remove(ids[3]).unwrap();

        assert_eq!(map.insert(10).index(), ids[3].index());
        assert_eq!(map.insert(11).index(), ids[1].index());
        assert_eq!(map.insert(12).index(), 4);
    }

    #[test]
    fn test_remove_third_of_five_then_add_two() {
        let mut map: SlotMap<Texture> = SlotMap::new();
        let ids: Vec<_> = (0..5).map(|_| map.add().0).collect();
        let third = ids[2];
        map.remove(third).unwrap();

        let first_new = map.add().0;
        let second_new = map.add().0;

        assert_eq!(first_new.index(), third.index());
        assert!(first_new.generation() > third.generation());
        assert_eq!(second_new.index(), 5);

        let reuse_count = map.iter().filter(|(id, _)| id.index() == third.index()).count();
        assert_eq!(reuse_count, 1);
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_growth_preserves_values_and_free_list() {
        let mut map: SlotMap<u32> = SlotMap::with_capacity(2);
        let ids: Vec<_> = (0..3).map(|v| map.insert(v)).collect();
        map.remove(ids[0]).unwrap();

        // Fill past several doublings.
        let more: Vec<_> = (100..200).map(|v| map.insert(v)).collect();
        assert!(map.capacity() >= 102);

        assert_eq!(more[0].index(), ids[0].index());
        assert_eq!(*map.get(ids[1]).unwrap(), 1);
        assert_eq!(*map.get(ids[2]).unwrap(), 2);
        for (offset, id) in more.iter().enumerate() {
            assert_eq!(*map.get(*id).unwrap(), 100 + offset as u32);
        }
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut map: SlotMap<u32> = SlotMap::new();
        let ids: Vec<_> = (0..3).map(|v| map.insert(v)).collect();
        map.clear();
        assert!(map.is_empty());
        assert!(ids.iter().all(|id| !map.has(*id)));

        let reused = map.insert(7);
        assert_eq!(reused.index(), 0);
        assert!(ids.iter().all(|id| *id != reused));
    }

    #[test]
    fn test_iter_skips_vacant() {
        let mut map: SlotMap<u32> = SlotMap::new();
        let a = map.insert(1);
        let b = map.insert(2);
        let c = map.insert(3);
        map.remove(b).unwrap();

        let live: Vec<_> = map.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(live, vec![(a, 1), (c, 3)]);

        for (_, value) in map.iter_mut() {
            *value *= 10;
        }
        assert_eq!(*map.get(c).unwrap(), 30);
    }

    #[test]
    fn test_invalid_id_never_resolves() {
        let mut map: SlotMap<u32> = SlotMap::new();
        map.insert(1);
        assert!(!map.has(SlotId::INVALID));
        assert!(map.get(SlotId::INVALID).is_err());
    }

    #[test]
    fn test_get_unchecked_on_live_slot() {
        let mut map: SlotMap<u32> = SlotMap::new();
        let id = map.insert(5);
        *map.get_unchecked_mut(id) += 1;
        assert_eq!(*map.get_unchecked(id), 6);
    }

    #[test]
    #[should_panic(expected = "vacant")]
    fn test_get_unchecked_on_vacant_slot_panics() {
        let mut map: SlotMap<u32> = SlotMap::new();
        let id = map.insert(5);
        map.remove(id).unwrap();
        let _ = map.get_unchecked(id);
    }

    #[test]
    fn test_stale_error_names_value_type() {
        let mut map: SlotMap<Texture> = SlotMap::new();
        let id = map.insert(Texture::default());
        map.remove(id).unwrap();
        let Err(CoreError::StaleHandle { kind, index, .. }) = map.get(id) else {
            panic!("expected a stale handle error");
        };
        assert!(kind.ends_with("Texture"));
        assert_eq!(index, id.index());
    }

    #[test]
    fn test_random_sequences_keep_generations_unique() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut map: SlotMap<u64> = SlotMap::with_capacity(4);
            let mut live: Vec<(SlotId<u64>, u64)> = Vec::new();
            let mut removed: Vec<SlotId<u64>> = Vec::new();

            for step in 0..500u64 {
                if live.is_empty() || rng.random_range(0..3) > 0 {
                    let id = map.insert(step);
                    live.push((id, step));
                } else {
                    let victim = rng.random_range(0..live.len());
                    let (id, value) = live.swap_remove(victim);
                    assert_eq!(map.remove(id).unwrap(), value);
                    removed.push(id);
                }

                let pairs: HashSet<(u32, u32)> =
                    live.iter().map(|(id, _)| (id.index(), id.generation())).collect();
                assert_eq!(pairs.len(), live.len());
                let indices: HashSet<u32> = live.iter().map(|(id, _)| id.index()).collect();
                assert_eq!(indices.len(), live.len());
            }

            assert_eq!(map.len(), live.len());
            for (id, value) in &live {
                assert_eq!(map.get(*id).unwrap(), value);
            }
            for id in &removed {
                assert!(!map.has(*id));
            }
        }
    }
}
