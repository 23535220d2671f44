//! Material registry.
//!
//! A material names a shader and a set of uniform values. Shaders and
//! textures are referenced by id, so removing them leaves stale references
//! behind; [`MaterialRegistry::is_renderable`] reports those.

use engine_core::{Result, SlotId};
use engine_math::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::asset::AssetStore;
use crate::shader::{ShaderId, ShaderRegistry};
use crate::texture::{TextureId, TextureRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransparencyType {
    #[default]
    Opaque,
    AlphaTest,
    Skybox,
    TransparentMix,
    TransparentAdd,
    TransparentSubtract,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(TextureId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub shader: Option<ShaderId>,
    pub transparency: TransparencyType,
    uniforms: Vec<(String, UniformValue)>,
}

impl Material {
    /// Set a uniform, replacing an earlier value of the same name.
    pub fn set_uniform(&mut self, name: impl Into<String>, value: UniformValue) {
        let name = name.into();
        match self.uniforms.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.uniforms.push((name, value)),
        }
    }

    #[must_use]
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, UniformValue)> + '_ {
        self.uniforms.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Every texture the material samples.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.uniforms.iter().filter_map(|(_, value)| match value {
            UniformValue::Texture(texture) => Some(*texture),
            _ => None,
        })
    }
}

pub type MaterialId = SlotId<Material>;

#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: AssetStore<Material>,
}

impl MaterialRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_material(&mut self) -> MaterialId {
        self.materials.insert(Material::default())
    }

    /// Create a new material with the same shader and values as `source`.
    /// The path is not copied.
    pub fn create_copy(&mut self, source: MaterialId) -> Result<MaterialId> {
        let copy = self.materials.get(source)?.clone();
        Ok(self.materials.insert(copy))
    }

    pub fn remove_material(&mut self, id: MaterialId) -> Result<Material> {
        self.materials.remove(id)
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Result<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Assign a shader. Fails if either id is stale.
    pub fn set_shader(
        &mut self,
        id: MaterialId,
        shader: ShaderId,
        shaders: &ShaderRegistry,
    ) -> Result<()> {
        shaders.shader(shader)?;
        self.materials.get_mut(id)?.shader = Some(shader);
        Ok(())
    }

    /// Bind a texture uniform. Fails if either id is stale.
    pub fn set_texture(
        &mut self,
        id: MaterialId,
        name: impl Into<String>,
        texture: TextureId,
        textures: &TextureRegistry,
    ) -> Result<()> {
        textures.texture(texture)?;
        self.materials
            .get_mut(id)?
            .set_uniform(name, UniformValue::Texture(texture));
        Ok(())
    }

    /// `true` if the material has a live shader and every texture it samples
    /// is live.
    pub fn is_renderable(
        &self,
        id: MaterialId,
        shaders: &ShaderRegistry,
        textures: &TextureRegistry,
    ) -> Result<bool> {
        let material = self.materials.get(id)?;
        let shader_ok = material.shader.is_some_and(|shader| shaders.has(shader));
        Ok(shader_ok && material.textures().all(|texture| textures.has(texture)))
    }

    pub fn set_path(&mut self, id: MaterialId, path: impl Into<String>) -> Result<()> {
        self.materials.set_path(id, path)
    }

    #[must_use]
    pub fn find_material_by_path(&self, path: &str) -> Option<MaterialId> {
        self.materials.find_by_path(path)
    }

    #[must_use]
    pub fn has(&self, id: MaterialId) -> bool {
        self.materials.has(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
