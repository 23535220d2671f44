//! Texture registry.

use engine_core::{Result, SlotId};
use serde::{Deserialize, Serialize};

use crate::asset::AssetStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureKind {
    #[default]
    Texture2d,
    Cube,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    R8,
    Rg8,
    Rgb8,
    #[default]
    Rgba8,
    Rgba16Float,
    Depth24,
}

impl TextureFormat {
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::Rg8 => 2,
            Self::Rgb8 | Self::Depth24 => 3,
            Self::Rgba8 => 4,
            Self::Rgba16Float => 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    pub kind: TextureKind,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

impl Texture {
    /// A 2D texture with a full mip chain.
    #[must_use]
    pub fn new_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            kind: TextureKind::Texture2d,
            format,
            width,
            height,
            mip_levels: full_mip_count(width, height),
        }
    }
}

/// Number of levels down to 1×1.
#[must_use]
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

pub type TextureId = SlotId<Texture>;

#[derive(Debug, Default)]
pub struct TextureRegistry {
    textures: AssetStore<Texture>,
}

impl TextureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.insert(texture)
    }

    pub fn remove_texture(&mut self, id: TextureId) -> Result<Texture> {
        self.textures.remove(id)
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture> {
        self.textures.get(id)
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Result<&mut Texture> {
        self.textures.get_mut(id)
    }

    pub fn set_path(&mut self, id: TextureId, path: impl Into<String>) -> Result<()> {
        self.textures.set_path(id, path)
    }

    #[must_use]
    pub fn find_texture_by_path(&self, path: &str) -> Option<TextureId> {
        self.textures.find_by_path(path)
    }

    #[must_use]
    pub fn has(&self, id: TextureId) -> bool {
        self.textures.has(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mip_count() {
        assert_eq!(full_mip_count(1, 1), 1);
        assert_eq!(full_mip_count(256, 256), 9);
        assert_eq!(full_mip_count(300, 17), 9);
        assert_eq!(full_mip_count(0, 0), 1);
    }

    #[test]
    fn test_texture_lifecycle() {
        let mut textures = TextureRegistry::new();
        let id = textures.create_texture(Texture::new_2d(512, 256, TextureFormat::Rgba8));
        textures.set_path(id, "textures/brick.png").unwrap();
        assert_eq!(textures.find_texture_by_path("textures/brick.png"), Some(id));
        assert_eq!(textures.texture(id).unwrap().mip_levels, 10);

        textures.remove_texture(id).unwrap();
        assert!(!textures.has(id));
        assert_eq!(textures.find_texture_by_path("textures/brick.png"), None);

        let reused = textures.create_texture(Texture::default());
        assert_eq!(reused.index(), id.index());
        assert_ne!(reused, id);
    }

    #[test]
    fn test_format_serialization_roundtrip() {
        let bytes = rmp_serde::to_vec(&TextureFormat::Rgba16Float).unwrap();
        let restored: TextureFormat = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(restored, TextureFormat::Rgba16Float);
        assert_eq!(restored.bytes_per_pixel(), 8);
    }
}
