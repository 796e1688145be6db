//! Global Pose Resolver
//!
//! Turns a [`LocalPose`] into node-to-model transforms and the skinning
//! palette.
//!
//! Nodes are topologically sorted, so one forward pass is enough:
//! `global[i] = global[parent[i]] * local[i]`, identity for roots.
//! Palette entries are `global_inverse_root * global[bone.node] * inverse_bind`
//! as column-major [`Mat4`]s (column vectors, `parent * child`).

use glam::{Affine3A, Mat4};

use crate::animation::LocalPose;
use crate::skeleton::Skeleton;

/// Globals and palette of the most recent evaluation.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPose {
    pub globals: Vec<Affine3A>,
    pub palette: Vec<Mat4>,
}

impl ResolvedPose {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    /// Model-space transform of `node`, if the pose has been resolved.
    #[inline]
    #[must_use]
    pub fn global(&self, node: usize) -> Option<Affine3A> {
        self.globals.get(node).copied()
    }

    pub fn resolve(&mut self, skeleton: &Skeleton, parents: &[Option<usize>], pose: &LocalPose) {
        compute_globals(parents, pose, &mut self.globals);
        build_palette(skeleton, &self.globals, &mut self.palette);
    }

    pub fn copy_from(&mut self, other: &ResolvedPose) {
        self.globals.clone_from(&other.globals);
        self.palette.clone_from(&other.palette);
    }
}

/// Single forward pass over the hierarchy.
pub fn compute_globals(parents: &[Option<usize>], pose: &LocalPose, out: &mut Vec<Affine3A>) {
    out.clear();
    out.reserve(pose.len());

    for (i, local) in pose.iter().enumerate() {
        let local = local.to_affine();
        let parent_global = parents
            .get(i)
            .copied()
            .flatten()
            .and_then(|p| out.get(p).copied());
        out.push(match parent_global {
            Some(parent) => parent * local,
            None => local,
        });
    }
}

/// Model-space transform of a single node, walking up its ancestors.
#[must_use]
pub fn compute_global(parents: &[Option<usize>], pose: &LocalPose, node: usize) -> Affine3A {
    let mut result = Affine3A::IDENTITY;
    let mut current = Some(node);
    while let Some(i) = current {
        let Some(local) = pose.get(i) else {
            break;
        };
        result = local.to_affine() * result;
        current = parents.get(i).copied().flatten();
    }
    result
}

pub fn build_palette(skeleton: &Skeleton, globals: &[Affine3A], out: &mut Vec<Mat4>) {
    let root_inv = skeleton.global_inverse_root();
    out.clear();
    out.extend(skeleton.bones().iter().map(|bone| {
        let global = globals.get(bone.node).copied().unwrap_or(Affine3A::IDENTITY);
        Mat4::from(root_inv * global * bone.inverse_bind)
    }));
}
