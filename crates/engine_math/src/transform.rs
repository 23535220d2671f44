//! Human-editable transform.
//!
//! [`EditTransform`] is the translation / Euler rotation / scale triple an
//! editor or gameplay code tweaks. The scene graph stores it next to each
//! node's local matrix and rebuilds the matrix from it on write.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Translation, Euler rotation (radians) and per-axis scale.
///
/// Rotation angles are applied X first, then Y, then Z, i.e. the rotation
/// matrix is `Rz * Ry * Rx`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EditTransform {
    pub translation: Vec3,
    /// Euler angles in radians around the X, Y and Z axes.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl EditTransform {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a transform that only translates.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Returns the rotation as a quaternion.
    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.rotation.z, self.rotation.y, self.rotation.x)
    }

    /// Compose the local matrix as `T * R * S`.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.translation)
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Translate by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.translation += offset;
        self
    }

    /// Apply a uniform scale factor.
    #[must_use]
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }
}

impl Default for EditTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(EditTransform::IDENTITY.to_matrix(), Mat4::IDENTITY);
        assert_eq!(EditTransform::default(), EditTransform::IDENTITY);
    }

    #[test]
    fn test_translation_only() {
        let t = EditTransform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let p = t.to_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_scale_applied_before_translation() {
        let t = EditTransform::from_translation(Vec3::X).with_scale(Vec3::splat(2.0));
        let p = t.to_matrix().transform_point3(Vec3::ONE);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 2.0), 1e-6));
    }

    #[test]
    fn test_rotation_about_z() {
        let t = EditTransform::IDENTITY.with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2));
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_rotation_order_x_then_z() {
        // X by 90° sends Y to Z; Z by 90° leaves Z alone.
        let t = EditTransform::IDENTITY.with_rotation(Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        let p = t.to_matrix().transform_point3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::Z, 1e-5));

        let expected = Mat4::from_rotation_z(FRAC_PI_2) * Mat4::from_rotation_x(FRAC_PI_2);
        assert!(t.to_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_builders_chain() {
        let t = EditTransform::IDENTITY
            .translated(Vec3::new(5.0, 0.0, 0.0))
            .translated(Vec3::new(0.0, 1.0, 0.0))
            .scaled(3.0);
        assert_eq!(t.translation, Vec3::new(5.0, 1.0, 0.0));
        assert_eq!(t.scale, Vec3::splat(3.0));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let t = EditTransform::from_translation(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(0.1, 0.2, 0.3));
        let bytes = rmp_serde::to_vec(&t).unwrap();
        let restored: EditTransform = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(t, restored);
    }
}
