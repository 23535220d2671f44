//! # engine_math
//!
//! Math types for the engine core. Re-exports [`glam`] for linear algebra and
//! defines [`EditTransform`], the editable form of a scene node's local
//! transform.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::EditTransform;
