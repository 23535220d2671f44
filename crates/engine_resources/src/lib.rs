//! # engine_resources
//!
//! Registries for everything the renderer references by handle.
//!
//! - Assets ([`MeshRegistry`], [`TextureRegistry`], [`ShaderRegistry`],
//!   [`MaterialRegistry`]) each wrap one slot map and can be found again by
//!   path.
//! - Per-entity components ([`RenderObjectRegistry`], [`CameraManager`],
//!   [`LightManager`]) are keyed by entity and implement
//!   [`TransformUpdateReceiver`](engine_scene::TransformUpdateReceiver) so the
//!   scene can push world transforms to them once per frame.

pub mod asset;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod render_object;
pub mod shader;
pub mod table;
pub mod texture;

pub use asset::AssetStore;
pub use camera::{Camera, CameraId, CameraManager, Projection};
pub use light::{Light, LightId, LightManager, LightType};
pub use material::{Material, MaterialId, MaterialRegistry, TransparencyType, UniformValue};
pub use mesh::{Aabb, Mesh, MeshId, MeshRegistry, PrimitiveMode};
pub use render_object::{RenderObject, RenderObjectId, RenderObjectRegistry};
pub use shader::{Shader, ShaderId, ShaderRegistry, Uniform, UniformKind};
pub use table::{EntityOwned, EntityTable};
pub use texture::{Texture, TextureFormat, TextureId, TextureKind, TextureRegistry};
