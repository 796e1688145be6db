//! Cyclic coordinate descent.
//!
//! Each iteration walks the chain from the tip's parent upward. At every
//! joint the globals are re-derived from the evolving local pose, the
//! joint→tip and joint→target directions are compared, and the joint is
//! rotated about their cross product (expressed in the joint's parent
//! space) by the angle between them, scaled by the chain weight.

use glam::{Affine3A, Quat, Vec3, Vec3A};
use smallvec::SmallVec;

use crate::animation::LocalPose;
use crate::config::IkSettings;
use crate::runtime::resolver::compute_globals;

const MIN_LENGTH: f32 = 1e-6;
const MIN_ANGLE: f32 = 1e-5;
const MIN_AXIS: f32 = 1e-6;

/// Per-chain result of [`CcdSolver::solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkOutcome {
    /// Tip-to-target distance after solving.
    pub distance: f32,
    pub iterations: u32,
    pub converged: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CcdSolver {
    pub settings: IkSettings,
    globals: Vec<Affine3A>,
}

impl CcdSolver {
    #[must_use]
    pub fn new(settings: IkSettings) -> Self {
        Self {
            settings,
            globals: Vec::new(),
        }
    }

    /// Joints that rotate for a chain ending at `tip`, nearest first.
    #[must_use]
    pub fn chain_joints(
        parents: &[Option<usize>],
        tip: usize,
        chain_length: usize,
    ) -> SmallVec<[usize; 4]> {
        let mut joints = SmallVec::new();
        let mut current = parents.get(tip).copied().flatten();
        while let Some(joint) = current {
            if joints.len() >= chain_length {
                break;
            }
            joints.push(joint);
            current = parents.get(joint).copied().flatten();
        }
        joints
    }

    /// Solves one chain in place on `pose`. `target` is in model space.
    pub fn solve(
        &mut self,
        parents: &[Option<usize>],
        pose: &mut LocalPose,
        tip: usize,
        chain_length: usize,
        target: Vec3,
        weight: f32,
    ) -> IkOutcome {
        let joints = Self::chain_joints(parents, tip, chain_length);
        let weight = weight.clamp(0.0, 1.0);
        let tolerance = self.settings.tolerance.max(0.0);

        compute_globals(parents, pose, &mut self.globals);
        let mut distance = self.tip_distance(tip, target);

        if joints.is_empty() || weight <= 0.0 {
            return IkOutcome {
                distance,
                iterations: 0,
                converged: distance <= tolerance,
            };
        }

        let mut iterations = 0;
        while iterations < self.settings.iterations && distance > tolerance {
            iterations += 1;
            for &joint in &joints {
                self.rotate_joint(parents, pose, joint, tip, target, weight);
                compute_globals(parents, pose, &mut self.globals);
                distance = self.tip_distance(tip, target);
                if distance <= tolerance {
                    break;
                }
            }
        }

        IkOutcome {
            distance,
            iterations,
            converged: distance <= tolerance,
        }
    }

    fn tip_distance(&self, tip: usize, target: Vec3) -> f32 {
        self.globals
            .get(tip)
            .map_or(f32::INFINITY, |g| (Vec3::from(g.translation) - target).length())
    }

    /// Rotates `joint` so the tip swings toward `target`. Degenerate
    /// geometry leaves the joint unchanged.
    fn rotate_joint(
        &self,
        parents: &[Option<usize>],
        pose: &mut LocalPose,
        joint: usize,
        tip: usize,
        target: Vec3,
        weight: f32,
    ) {
        let (Some(joint_global), Some(tip_global)) = (self.globals.get(joint), self.globals.get(tip))
        else {
            return;
        };
        let joint_pos = Vec3::from(joint_global.translation);
        let to_tip = Vec3::from(tip_global.translation) - joint_pos;
        let to_target = target - joint_pos;
        if to_tip.length() < MIN_LENGTH || to_target.length() < MIN_LENGTH {
            return;
        }

        let from = to_tip.normalize();
        let to = to_target.normalize();
        let angle = from.dot(to).clamp(-1.0, 1.0).acos();
        if angle < MIN_ANGLE {
            return;
        }
        let axis = from.cross(to);
        if axis.length() < MIN_AXIS {
            return;
        }

        // model-space axis into the joint's parent space
        let parent_global = parents
            .get(joint)
            .copied()
            .flatten()
            .and_then(|p| self.globals.get(p));
        let axis = match parent_global {
            Some(parent) => parent.matrix3.inverse() * Vec3A::from(axis.normalize()),
            None => Vec3A::from(axis.normalize()),
        };
        let Some(axis) = Vec3::from(axis).try_normalize() else {
            return;
        };

        let delta = Quat::from_axis_angle(axis, angle * weight);
        let local = &mut pose[joint];
        local.rotation = (delta * local.rotation).normalize();
    }
}
