//! Shader registry.
//!
//! Only the reflected interface of a compiled program is kept here: its name
//! and the uniforms materials may set.

use engine_core::{Result, SlotId};
use serde::{Deserialize, Serialize};

use crate::asset::AssetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Texture2d,
    TextureCube,
}

impl UniformKind {
    #[must_use]
    pub const fn is_texture(self) -> bool {
        matches!(self, Self::Texture2d | Self::TextureCube)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uniform {
    pub name: String,
    pub kind: UniformKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shader {
    pub name: String,
    pub uniforms: Vec<Uniform>,
}

impl Shader {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uniforms: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_uniform(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        self.uniforms.push(Uniform {
            name: name.into(),
            kind,
        });
        self
    }

    #[must_use]
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

pub type ShaderId = SlotId<Shader>;

#[derive(Debug, Default)]
pub struct ShaderRegistry {
    shaders: AssetStore<Shader>,
}

impl ShaderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_shader(&mut self, shader: Shader) -> ShaderId {
        self.shaders.insert(shader)
    }

    pub fn remove_shader(&mut self, id: ShaderId) -> Result<Shader> {
        self.shaders.remove(id)
    }

    pub fn shader(&self, id: ShaderId) -> Result<&Shader> {
        self.shaders.get(id)
    }

    pub fn set_path(&mut self, id: ShaderId, path: impl Into<String>) -> Result<()> {
        self.shaders.set_path(id, path)
    }

    #[must_use]
    pub fn find_shader_by_path(&self, path: &str) -> Option<ShaderId> {
        self.shaders.find_by_path(path)
    }

    /// First shader with the given name, in slot order.
    #[must_use]
    pub fn find_shader_by_name(&self, name: &str) -> Option<ShaderId> {
        self.shaders
            .iter()
            .find(|(_, shader)| shader.name == name)
            .map(|(id, _)| id)
    }

    #[must_use]
    pub fn has(&self, id: ShaderId) -> bool {
        self.shaders.has(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
