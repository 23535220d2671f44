//! Mesh registry.

use engine_core::{Result, SlotId};
use engine_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::asset::AssetStore;

/// Axis-aligned bounding box stored as center and half extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Aabb {
    /// Smallest box containing every point. `None` for no points.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        })
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

/// Draw metadata of an uploaded mesh. Vertex data itself lives on the GPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertex_count: u32,
    /// Zero for non-indexed meshes.
    pub index_count: u32,
    pub primitive_mode: PrimitiveMode,
    pub bounds: Aabb,
}

impl Mesh {
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index_count > 0
    }
}

pub type MeshId = SlotId<Mesh>;

#[derive(Debug, Default)]
pub struct MeshRegistry {
    meshes: AssetStore<Mesh>,
}

impl MeshRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh to be filled in later.
    pub fn create_mesh(&mut self) -> MeshId {
        self.meshes.insert(Mesh::default())
    }

    pub fn insert_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.insert(mesh)
    }

    pub fn remove_mesh(&mut self, id: MeshId) -> Result<Mesh> {
        self.meshes.remove(id)
    }

    pub fn mesh(&self, id: MeshId) -> Result<&Mesh> {
        self.meshes.get(id)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Result<&mut Mesh> {
        self.meshes.get_mut(id)
    }

    pub fn set_bounds(&mut self, id: MeshId, bounds: Aabb) -> Result<()> {
        self.meshes.get_mut(id)?.bounds = bounds;
        Ok(())
    }

    pub fn set_path(&mut self, id: MeshId, path: impl Into<String>) -> Result<()> {
        self.meshes.set_path(id, path)
    }

    #[must_use]
    pub fn path(&self, id: MeshId) -> Option<&str> {
        self.meshes.path(id)
    }

    #[must_use]
    pub fn find_mesh_by_path(&self, path: &str) -> Option<MeshId> {
        self.meshes.find_by_path(path)
    }

    #[must_use]
    pub fn has(&self, id: MeshId) -> bool {
        self.meshes.has(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> + '_ {
        self.meshes.iter()
    }
}
