use glam::{Affine3A, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Axis magnitude below which a sampled scale is treated as collapsed.
pub const SCALE_EPSILON: f32 = 1e-6;

/// Local TRS transform of one skeleton node.
///
/// Stored in parent space. Composition follows glam's column-vector
/// convention: `matrix = T * R * S`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    #[must_use]
    pub fn new(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Decomposes an affine matrix. Shear is lost.
    #[must_use]
    pub fn from_affine(mat: &Affine3A) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            scale,
            rotation,
            translation,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Channel-wise blend: lerp for scale/translation, shortest-arc slerp
    /// for rotation. `weight = 0` returns `self`, `weight = 1` returns `other`.
    #[must_use]
    pub fn blend(&self, other: &Self, weight: f32) -> Self {
        if weight <= 0.0 {
            return *self;
        }
        if weight >= 1.0 {
            return *other;
        }
        Self {
            scale: self.scale.lerp(other.scale, weight),
            rotation: slerp_shortest(self.rotation, other.rotation, weight),
            translation: self.translation.lerp(other.translation, weight),
        }
    }

    /// Replaces any near-zero scale axis with 1.0 so a bone never collapses.
    #[must_use]
    pub fn with_scale_floor(mut self) -> Self {
        self.scale = scale_floor(self.scale);
        self
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Spherical interpolation along the shorter arc, always unit length.
#[must_use]
pub fn slerp_shortest(a: Quat, b: Quat, t: f32) -> Quat {
    let b = if a.dot(b) < 0.0 { -b } else { b };
    a.slerp(b, t).normalize()
}

#[inline]
#[must_use]
pub fn scale_floor(scale: Vec3) -> Vec3 {
    let fix = |v: f32| if v.abs() < SCALE_EPSILON { 1.0 } else { v };
    Vec3::new(fix(scale.x), fix(scale.y), fix(scale.z))
}
