//! CCD IK Tests
//!
//! Tests for:
//! - Chain joint selection
//! - Reachable targets converge, within tolerance at the default budget
//! - Unreachable targets: full extension toward the target
//! - Monotone distance with growing iteration budget
//! - Weight, tolerance and degenerate geometry
//! - Animator integration: IK skipped on bind pose, missing tips

mod common;

use glam::Vec3;

use stance::animation::LocalPose;
use stance::config::{AnimationConfig, IkSettings};
use stance::graph::{BaseLayer, IkChainDescriptor, LayerParams};
use stance::ik::CcdSolver;
use stance::runtime::{AnimatedEntity, AnimationWorld, compute_global, compute_globals};

use common::*;

const EPSILON: f32 = 1e-4;

fn bind_pose() -> (Vec<Option<usize>>, LocalPose) {
    let skeleton = rig_skeleton();
    (skeleton.parent_indices(), LocalPose::bind(&skeleton))
}

fn solver(iterations: u32) -> CcdSolver {
    CcdSolver::new(IkSettings {
        iterations,
        tolerance: 1e-3,
    })
}

fn position(parents: &[Option<usize>], pose: &LocalPose, node: usize) -> Vec3 {
    translation(&compute_global(parents, pose, node))
}

// ============================================================================
// Chain selection
// ============================================================================

#[test]
fn chain_joints_walk_up_from_tip() {
    let (parents, _) = bind_pose();
    let joints = CcdSolver::chain_joints(&parents, HAND_L, 2);
    assert_eq!(joints.as_slice(), &[LOWER_ARM_L, UPPER_ARM_L]);
}

#[test]
fn chain_joints_stop_at_root() {
    let (parents, _) = bind_pose();
    let joints = CcdSolver::chain_joints(&parents, HIPS, 10);
    assert_eq!(joints.as_slice(), &[ROOT]);
    assert!(CcdSolver::chain_joints(&parents, ROOT, 3).is_empty());
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn reachable_target_converges() {
    let (parents, mut pose) = bind_pose();
    let shoulder = position(&parents, &pose, UPPER_ARM_L);
    let target = shoulder + Vec3::new(0.5, 1.1, 0.4);

    let outcome = solver(20).solve(&parents, &mut pose, HAND_L, 2, target, 1.0);

    let hand = position(&parents, &pose, HAND_L);
    assert!((hand - target).length() < 0.05, "hand {hand} target {target}");
    assert!((outcome.distance - (hand - target).length()).abs() < EPSILON);
}

#[test]
fn default_budget_lands_near_reachable_target() {
    let (parents, mut pose) = bind_pose();
    let shoulder = position(&parents, &pose, UPPER_ARM_L);
    let target = shoulder + Vec3::new(0.5, 1.1, 0.4);
    let start = (position(&parents, &pose, HAND_L) - target).length();

    let settings = IkSettings::default();
    assert_eq!(settings.iterations, 5);
    let outcome = CcdSolver::new(settings).solve(&parents, &mut pose, HAND_L, 2, target, 1.0);

    // five sweeps leave a few centimetres on a two-bone arm
    let hand = position(&parents, &pose, HAND_L);
    let residual = (hand - target).length();
    assert!(residual < 0.1, "residual {residual}");
    assert!(residual < start);
    assert!((outcome.distance - residual).abs() < EPSILON);
}

#[test]
fn unreachable_target_fully_extends_toward_it() {
    let (parents, mut pose) = bind_pose();
    let shoulder = position(&parents, &pose, UPPER_ARM_L);
    let direction = Vec3::new(1.0, 1.0, 0.5).normalize();
    let target = shoulder + direction * 10.0;

    let outcome = solver(20).solve(&parents, &mut pose, HAND_L, 2, target, 1.0);
    assert!(!outcome.converged);

    let hand = position(&parents, &pose, HAND_L);
    let reach = hand - shoulder;
    assert!(reach.length() > 1.95, "extension {}", reach.length());
    assert!(reach.normalize().dot(direction) > 0.99);
}

#[test]
fn distance_never_grows_with_more_iterations() {
    let (parents, bind) = bind_pose();
    let target = position(&parents, &bind, UPPER_ARM_L) + Vec3::new(-0.3, 1.2, 0.9);

    let mut previous = f32::INFINITY;
    for iterations in 0..8 {
        let mut pose = bind.clone();
        let outcome = solver(iterations).solve(&parents, &mut pose, HAND_L, 2, target, 1.0);
        assert!(
            outcome.distance <= previous + 1e-5,
            "{iterations} iterations: {} > {previous}",
            outcome.distance
        );
        previous = outcome.distance;
    }
}

#[test]
fn only_chain_joints_rotate() {
    let (parents, mut pose) = bind_pose();
    let before = pose.clone();
    let target = position(&parents, &pose, UPPER_ARM_L) + Vec3::new(0.2, 1.5, 0.0);

    solver(10).solve(&parents, &mut pose, HAND_L, 2, target, 1.0);

    for node in [ROOT, HIPS, SPINE, CHEST, SHOULDER_L, HAND_L, UPPER_LEG_L] {
        assert_eq!(pose[node], before[node], "node {node}");
    }
    assert_ne!(pose[LOWER_ARM_L], before[LOWER_ARM_L]);
    for node in [UPPER_ARM_L, LOWER_ARM_L] {
        assert!((pose[node].rotation.length() - 1.0).abs() < EPSILON);
        assert_eq!(pose[node].translation, before[node].translation);
    }
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn target_within_tolerance_skips_iterations() {
    let (parents, mut pose) = bind_pose();
    let hand = position(&parents, &pose, HAND_L);

    let outcome = solver(10).solve(&parents, &mut pose, HAND_L, 2, hand, 1.0);
    assert_eq!(outcome.iterations, 0);
    assert!(outcome.converged);
}

#[test]
fn zero_weight_leaves_pose_unchanged() {
    let (parents, mut pose) = bind_pose();
    let before = pose.clone();

    let outcome = solver(10).solve(&parents, &mut pose, HAND_L, 2, Vec3::new(0.0, 3.0, 0.0), 0.0);
    assert_eq!(pose, before);
    assert_eq!(outcome.iterations, 0);
}

#[test]
fn target_on_joint_produces_finite_pose() {
    let (parents, mut pose) = bind_pose();
    let elbow = position(&parents, &pose, LOWER_ARM_L);

    solver(10).solve(&parents, &mut pose, HAND_L, 2, elbow, 1.0);

    let mut globals = Vec::new();
    compute_globals(&parents, &pose, &mut globals);
    assert!(globals.iter().all(|g| g.is_finite()));
}

// ============================================================================
// Animator integration
// ============================================================================

fn world_with(params: LayerParams) -> (AnimationWorld, stance::EntityKey) {
    init_logger();
    let mut config = AnimationConfig::default();
    config.ik.iterations = 20;
    let mut world = AnimationWorld::with_config(config);
    world.assets_mut().insert(MESH, rig_skeleton(), all_clips());
    let key = world.spawn(AnimatedEntity::new(MESH).with_animator(params));
    (world, key)
}

#[test]
fn animator_solves_chains_after_blending() {
    let target = Vec3::new(1.0, 2.6, 0.5);
    let (mut world, key) = world_with(LayerParams {
        base: BaseLayer::single("Idle"),
        ik_chains: vec![IkChainDescriptor::new("Hand_L", 2, target)],
        ..Default::default()
    });

    world.update(0.0);

    let entity = world.entity(key).unwrap();
    let animator = entity.animator.as_ref().unwrap();
    assert_eq!(animator.ik_outcomes().len(), 1);

    let hand = translation(&entity.globals()[HAND_L]);
    assert!((hand - target).length() < 0.05);
}

#[test]
fn bind_pose_output_skips_ik() {
    let (mut world, key) = world_with(LayerParams {
        ik_chains: vec![IkChainDescriptor::new("Hand_L", 2, Vec3::new(0.0, 3.0, 0.0))],
        ..Default::default()
    });

    world.update(0.1);

    let animator = world.entity(key).unwrap().animator.as_ref().unwrap();
    assert!(animator.ik_outcomes().is_empty());
    assert!(!animator.output().driving);
}

#[test]
fn unknown_tip_skips_chain_only() {
    let (mut world, key) = world_with(LayerParams {
        base: BaseLayer::single("Idle"),
        ik_chains: vec![
            IkChainDescriptor::new("Hand_R", 2, Vec3::ZERO),
            IkChainDescriptor::new("Hand_L", 2, Vec3::new(1.0, 2.6, 0.5)),
        ],
        ..Default::default()
    });

    world.update(0.1);
    world.update(0.1);

    let animator = world.entity(key).unwrap().animator.as_ref().unwrap();
    assert_eq!(animator.ik_outcomes().len(), 1);
    assert!(animator.output().driving);
}

#[test]
fn disabled_chain_is_ignored() {
    let mut chain = IkChainDescriptor::new("Hand_L", 2, Vec3::new(0.0, 3.0, 0.0));
    chain.enabled = false;
    let (mut world, key) = world_with(LayerParams {
        base: BaseLayer::single("Idle"),
        ik_chains: vec![chain],
        ..Default::default()
    });

    world.update(0.1);

    let animator = world.entity(key).unwrap().animator.as_ref().unwrap();
    assert!(animator.ik_outcomes().is_empty());
}
