//! Shared fixtures: a small biped rig and a handful of clips.
//!
//! All clips run at one tick per second, so key times read as seconds.

#![allow(dead_code)]

use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use stance::animation::{AnimationClip, InterpolationMode, KeyframeTrack, LocalPose, NodeChannel};
use stance::assets::MeshAsset;
use stance::config::AnimationConfig;
use stance::runtime::{RigCache, compute_globals};
use stance::skeleton::{Bone, LocalTransform, Skeleton, SkeletonNode};

pub const MESH: &str = "hero.mesh";

pub const ROOT: usize = 0;
pub const HIPS: usize = 1;
pub const SPINE: usize = 2;
pub const CHEST: usize = 3;
pub const SHOULDER_L: usize = 4;
pub const UPPER_ARM_L: usize = 5;
pub const LOWER_ARM_L: usize = 6;
pub const HAND_L: usize = 7;
pub const UPPER_LEG_L: usize = 8;
pub const LOWER_LEG_L: usize = 9;
pub const FOOT_L: usize = 10;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn node(name: &str, parent: Option<usize>, translation: Vec3) -> SkeletonNode {
    SkeletonNode::new(name, parent, LocalTransform::from_translation(translation))
}

pub fn rig_nodes() -> Vec<SkeletonNode> {
    vec![
        node("Root", None, Vec3::ZERO),
        node("Hips", Some(ROOT), Vec3::new(0.0, 1.0, 0.0)),
        node("Spine", Some(HIPS), Vec3::new(0.0, 0.2, 0.0)),
        node("Chest", Some(SPINE), Vec3::new(0.0, 0.2, 0.0)),
        node("Shoulder_L", Some(CHEST), Vec3::new(0.2, 0.1, 0.0)),
        node("UpperArm_L", Some(SHOULDER_L), Vec3::new(0.1, 0.0, 0.0)),
        node("LowerArm_L", Some(UPPER_ARM_L), Vec3::new(1.0, 0.0, 0.0)),
        node("Hand_L", Some(LOWER_ARM_L), Vec3::new(1.0, 0.0, 0.0)),
        node("UpperLeg_L", Some(HIPS), Vec3::new(0.1, -0.1, 0.0)),
        node("LowerLeg_L", Some(UPPER_LEG_L), Vec3::new(0.0, -0.5, 0.0)),
        node("Foot_L", Some(LOWER_LEG_L), Vec3::new(0.0, -0.5, 0.0)),
    ]
}

/// Every node is skinned; inverse binds invert the rest globals, so the
/// bind-pose palette is identity.
pub fn rig_skeleton_with_root(global_inverse_root: Affine3A) -> Skeleton {
    let nodes = rig_nodes();
    let parents: Vec<Option<usize>> = nodes.iter().map(|n| n.parent).collect();
    let bind = LocalPose::new(nodes.iter().map(|n| n.bind_local).collect());

    let mut globals = Vec::new();
    compute_globals(&parents, &bind, &mut globals);

    let bones = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| Bone {
            name: n.name.clone(),
            node: i,
            inverse_bind: globals[i].inverse(),
        })
        .collect();

    Skeleton::new("Biped", nodes, bones, global_inverse_root).unwrap()
}

pub fn rig_skeleton() -> Skeleton {
    rig_skeleton_with_root(Affine3A::IDENTITY)
}

fn constant<T: stance::animation::Interpolatable>(value: T) -> KeyframeTrack<T> {
    KeyframeTrack::new(vec![0.0], vec![value], InterpolationMode::Linear)
}

pub fn rot_x(angle: f32) -> Quat {
    Quat::from_rotation_x(angle)
}

pub fn rot_y(angle: f32) -> Quat {
    Quat::from_rotation_y(angle)
}

pub fn rot_z(angle: f32) -> Quat {
    Quat::from_rotation_z(angle)
}

/// 1.2 s loop. Hips bob up to y = 1.1 at 0.6 s.
pub fn idle_clip() -> AnimationClip {
    AnimationClip::new(
        "Idle",
        1.2,
        1.0,
        vec![NodeChannel::new("Hips").with_translations(KeyframeTrack::new(
            vec![0.0, 0.6, 1.2],
            vec![
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 1.1, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            InterpolationMode::Linear,
        ))],
    )
    .unwrap()
}

/// 0.8 s loop. Lowered hips, leaned spine, swinging leg.
pub fn run_clip() -> AnimationClip {
    AnimationClip::new(
        "Run",
        0.8,
        1.0,
        vec![
            NodeChannel::new("Hips").with_translations(constant(Vec3::new(0.0, 0.9, 0.0))),
            NodeChannel::new("Spine").with_rotations(constant(rot_x(0.3))),
            NodeChannel::new("UpperLeg_L").with_rotations(KeyframeTrack::new(
                vec![0.0, 0.4, 0.8],
                vec![rot_x(-0.5), rot_x(0.5), rot_x(-0.5)],
                InterpolationMode::Linear,
            )),
        ],
    )
    .unwrap()
}

/// Raised left arm. Also keys the hips, which an upper-body overlay must ignore.
pub fn wave_clip() -> AnimationClip {
    AnimationClip::new(
        "Wave",
        1.0,
        1.0,
        vec![
            NodeChannel::new("UpperArm_L").with_rotations(constant(rot_z(1.0))),
            NodeChannel::new("Hips").with_translations(constant(Vec3::new(0.0, 5.0, 0.0))),
        ],
    )
    .unwrap()
}

/// Spine pitch growing from 0 to 0.4 rad over one second.
pub fn lean_clip() -> AnimationClip {
    AnimationClip::new(
        "Lean",
        1.0,
        1.0,
        vec![NodeChannel::new("Spine").with_rotations(KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, rot_x(0.4)],
            InterpolationMode::Linear,
        ))],
    )
    .unwrap()
}

pub fn all_clips() -> Vec<AnimationClip> {
    vec![idle_clip(), run_clip(), wave_clip(), lean_clip()]
}

pub fn mesh_asset() -> Arc<MeshAsset> {
    Arc::new(MeshAsset::new(MESH, rig_skeleton(), all_clips()))
}

pub fn rig_cache_with(config: &AnimationConfig) -> RigCache {
    RigCache::build(mesh_asset(), config)
}

pub fn rig_cache() -> RigCache {
    rig_cache_with(&AnimationConfig::default())
}

/// Cache sampling keyframes directly instead of through precomputed tables.
pub fn rig_cache_on_the_fly() -> RigCache {
    let mut config = AnimationConfig::default();
    config.sampling.precompute = false;
    rig_cache_with(&config)
}

pub fn translation(affine: &Affine3A) -> Vec3 {
    Vec3::from(affine.translation)
}
