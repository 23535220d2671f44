//! Slot map with an optional path per value.
//!
//! Meshes, textures, shaders and materials are usually loaded from a path and
//! later found again by it. [`AssetStore`] keeps that index next to the
//! [`SlotMap`] and drops a value's path when the value is removed.

use std::collections::HashMap;

use engine_core::{Result, SlotId, SlotMap};
use tracing::{trace, warn};

#[derive(Debug, Clone)]
pub struct AssetStore<T> {
    items: SlotMap<T>,
    by_path: HashMap<String, SlotId<T>>,
    paths: HashMap<SlotId<T>, String>,
}

impl<T> AssetStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SlotMap::new(),
            by_path: HashMap::new(),
            paths: HashMap::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId<T> {
        let id = self.items.insert(value);
        trace!(kind = std::any::type_name::<T>(), ?id, "asset created");
        id
    }

    /// Remove a value together with its path.
    pub fn remove(&mut self, id: SlotId<T>) -> Result<T> {
        let value = self.items.remove(id)?;
        if let Some(path) = self.paths.remove(&id) {
            self.by_path.remove(&path);
        }
        trace!(kind = std::any::type_name::<T>(), ?id, "asset removed");
        Ok(value)
    }

    pub fn get(&self, id: SlotId<T>) -> Result<&T> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: SlotId<T>) -> Result<&mut T> {
        self.items.get_mut(id)
    }

    #[must_use]
    pub fn has(&self, id: SlotId<T>) -> bool {
        self.items.has(id)
    }

    /// Bind `path` to `id`, replacing any path `id` had before.
    ///
    /// A path names at most one value. Binding a path that already names
    /// another value moves it.
    pub fn set_path(&mut self, id: SlotId<T>, path: impl Into<String>) -> Result<()> {
        self.items.get(id)?;
        let path = path.into();

        if let Some(previous) = self.by_path.get(&path).copied()
            && previous != id
        {
            warn!(%path, ?previous, ?id, "path rebound to another asset");
            self.paths.remove(&previous);
        }
        if let Some(old_path) = self.paths.remove(&id) {
            self.by_path.remove(&old_path);
        }

        self.by_path.insert(path.clone(), id);
        self.paths.insert(id, path);
        Ok(())
    }

    #[must_use]
    pub fn path(&self, id: SlotId<T>) -> Option<&str> {
        self.paths.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<SlotId<T>> {
        self.by_path.get(path).copied()
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
        self.by_path.clear();
        self.paths.clear();
    }
}

impl<T> Default for AssetStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
