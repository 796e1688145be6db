use std::ops::{Index, IndexMut};

use glam::{Quat, Vec3};

use crate::skeleton::{BoneMask, LocalTransform, Skeleton, slerp_shortest};

/// Reference scale magnitude below which the additive scale ratio is ignored.
const ADDITIVE_SCALE_EPSILON: f32 = 1e-4;

/// One local transform per skeleton node, indexed by node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalPose {
    transforms: Vec<LocalTransform>,
}

impl LocalPose {
    #[must_use]
    pub fn new(transforms: Vec<LocalTransform>) -> Self {
        Self { transforms }
    }

    #[must_use]
    pub fn bind(skeleton: &Skeleton) -> Self {
        Self {
            transforms: skeleton.nodes().iter().map(|n| n.bind_local).collect(),
        }
    }

    #[must_use]
    pub fn identity(node_count: usize) -> Self {
        Self {
            transforms: vec![LocalTransform::IDENTITY; node_count],
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[LocalTransform] {
        &self.transforms
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [LocalTransform] {
        &mut self.transforms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocalTransform> {
        self.transforms.iter()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, node: usize) -> Option<&LocalTransform> {
        self.transforms.get(node)
    }

    /// Overwrites `self` with `other`, reusing the allocation.
    pub fn copy_from(&mut self, other: &LocalPose) {
        self.transforms.clear();
        self.transforms.extend_from_slice(&other.transforms);
    }

    /// `self = blend(self, other, weight)` for every node.
    pub fn blend_with(&mut self, other: &LocalPose, weight: f32) {
        if weight <= 0.0 {
            return;
        }
        for (dst, src) in self.transforms.iter_mut().zip(other.iter()) {
            *dst = dst.blend(src, weight);
        }
    }

    /// Writes `blend(a, b, weight)` into `self`.
    pub fn blend_into(&mut self, a: &LocalPose, b: &LocalPose, weight: f32) {
        self.transforms.clear();
        self.transforms
            .extend(a.iter().zip(b.iter()).map(|(x, y)| x.blend(y, weight)));
    }

    /// Per-node blend scaled by the mask weight of each node.
    pub fn blend_masked(&mut self, other: &LocalPose, mask: &BoneMask, weight: f32) {
        if weight <= 0.0 {
            return;
        }
        for node in mask.active_nodes() {
            let w = mask.weight(node) * weight;
            if let (Some(dst), Some(src)) = (self.transforms.get_mut(node), other.get(node)) {
                *dst = dst.blend(src, w);
            }
        }
    }

    /// Layers the difference `additive - reference` on top of `self`.
    ///
    /// Rotation: `slerp(I, additive * reference⁻¹, weight) * current`.
    /// Translation: `current + (additive - reference) * weight`.
    /// Scale: `current * lerp(1, additive / reference, weight)` per axis;
    /// an axis whose reference scale is near zero contributes no change.
    pub fn apply_additive(
        &mut self,
        additive: &LocalPose,
        reference: &LocalPose,
        mask: Option<&BoneMask>,
        weight: f32,
    ) {
        if weight <= 0.0 {
            return;
        }
        for (node, dst) in self.transforms.iter_mut().enumerate() {
            let w = mask.map_or(weight, |m| m.weight(node) * weight);
            if w <= 0.0 {
                continue;
            }
            let (Some(add), Some(reference)) = (additive.get(node), reference.get(node)) else {
                continue;
            };

            let delta_rot = (add.rotation * reference.rotation.inverse()).normalize();
            let weighted = slerp_shortest(Quat::IDENTITY, delta_rot, w);
            dst.rotation = (weighted * dst.rotation).normalize();

            dst.translation += (add.translation - reference.translation) * w;

            let ratio = additive_scale_ratio(add.scale, reference.scale);
            dst.scale *= Vec3::ONE.lerp(ratio, w);
        }
    }
}

fn additive_scale_ratio(additive: Vec3, reference: Vec3) -> Vec3 {
    let axis = |a: f32, r: f32| {
        if r.abs() < ADDITIVE_SCALE_EPSILON {
            1.0
        } else {
            a / r
        }
    };
    Vec3::new(
        axis(additive.x, reference.x),
        axis(additive.y, reference.y),
        axis(additive.z, reference.z),
    )
}

impl Index<usize> for LocalPose {
    type Output = LocalTransform;

    fn index(&self, index: usize) -> &Self::Output {
        &self.transforms[index]
    }
}

impl IndexMut<usize> for LocalPose {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.transforms[index]
    }
}

impl<'a> IntoIterator for &'a LocalPose {
    type Item = &'a LocalTransform;
    type IntoIter = std::slice::Iter<'a, LocalTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.iter()
    }
}
