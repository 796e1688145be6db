//! Pose Blend Tests
//!
//! Tests for:
//! - LocalTransform / LocalPose blending: weight endpoints, unit rotations, shortest arc
//! - Base layer A/B blend and missing clips
//! - Upper-body masked overlay
//! - Additive layer: reference clip, reference time, mask, zero-scale guard
//! - Procedural noise and aim offset

mod common;

use glam::{Quat, Vec3};

use stance::animation::{ClipSlot, LocalPose};
use stance::graph::{
    AdditiveLayer, AdditiveMask, AimOffset, BaseLayer, GraphOutcome, LayerParams, PoseBlendGraph,
    ProceduralNoise, UpperBodyLayer,
};
use stance::runtime::{RigCache, compute_global};
use stance::skeleton::{BoneMask, LocalTransform};

use common::*;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

fn evaluate(params: &mut LayerParams, cache: &RigCache, dt: f32) -> (GraphOutcome, LocalPose) {
    let mut graph = PoseBlendGraph::new();
    let mut out = LocalPose::default();
    let outcome = graph.evaluate(params, cache, dt, &mut out);
    (outcome, out)
}

fn idle_base() -> LayerParams {
    LayerParams {
        base: BaseLayer::single("Idle"),
        ..Default::default()
    }
}

// ============================================================================
// Transform blending
// ============================================================================

#[test]
fn blend_weight_endpoints_are_exact() {
    let a = LocalTransform::new(Vec3::ONE, rot_x(0.3), Vec3::new(1.0, 2.0, 3.0));
    let b = LocalTransform::new(Vec3::splat(2.0), rot_z(1.2), Vec3::new(-1.0, 0.0, 4.0));

    assert_eq!(a.blend(&b, 0.0), a);
    assert_eq!(a.blend(&b, 1.0), b);
    assert_eq!(a.blend(&b, -0.5), a);
    assert_eq!(a.blend(&b, 1.5), b);
}

#[test]
fn blended_rotations_stay_unit_length() {
    let a = LocalTransform::from_rotation(rot_x(0.3));
    let b = LocalTransform::from_rotation(rot_z(2.0));
    for i in 0..=20 {
        let w = i as f32 / 20.0;
        assert!(approx(a.blend(&b, w).rotation.length(), 1.0), "w = {w}");
    }
}

#[test]
fn rotation_blend_takes_shortest_arc() {
    let a = LocalTransform::IDENTITY;
    // same orientation as rot_y(0.4), opposite hemisphere
    let b = LocalTransform::from_rotation(-rot_y(0.4));

    let mid = a.blend(&b, 0.5);
    assert!(approx(mid.rotation.angle_between(Quat::IDENTITY), 0.2));
    assert!(quat_approx(mid.rotation, rot_y(0.2)));
}

#[test]
fn pose_blend_at_one_copies_other() {
    let mut pose = LocalPose::identity(3);
    let other = LocalPose::new(vec![LocalTransform::from_translation(Vec3::X); 3]);
    pose.blend_with(&other, 1.0);
    assert_eq!(pose, other);
}

#[test]
fn masked_blend_scales_by_node_weight() {
    let mut pose = LocalPose::identity(3);
    let other = LocalPose::new(vec![LocalTransform::from_translation(Vec3::X); 3]);
    let mut mask = BoneMask::empty(3);
    mask.set_weight(1, 0.5);
    mask.set_weight(2, 1.0);

    pose.blend_masked(&other, &mask, 1.0);
    assert!(approx(pose[0].translation.x, 0.0));
    assert!(approx(pose[1].translation.x, 0.5));
    assert!(approx(pose[2].translation.x, 1.0));
}

// ============================================================================
// Base layer
// ============================================================================

#[test]
fn missing_base_clip_yields_bind_pose() {
    let cache = rig_cache();

    let mut params = LayerParams::default();
    let (outcome, pose) = evaluate(&mut params, &cache, 0.1);
    assert_eq!(outcome, GraphOutcome::BindPose);
    assert_eq!(&pose, cache.bind_pose());

    let mut params = LayerParams {
        base: BaseLayer::single("Nope"),
        upper_body: UpperBodyLayer {
            enabled: true,
            a: ClipSlot::new("Wave"),
            ..Default::default()
        },
        ..Default::default()
    };
    let (outcome, pose) = evaluate(&mut params, &cache, 0.1);
    assert_eq!(outcome, GraphOutcome::BindPose);
    assert_eq!(&pose, cache.bind_pose());
}

#[test]
fn base_blend_mixes_a_and_b() {
    let cache = rig_cache();
    let mut params = LayerParams {
        base: BaseLayer {
            a: ClipSlot::new("Idle"),
            b: ClipSlot::new("Run"),
            blend: 0.5,
            ..Default::default()
        },
        ..Default::default()
    };

    let (outcome, pose) = evaluate(&mut params, &cache, 0.0);
    assert_eq!(outcome, GraphOutcome::Evaluated);
    assert!(approx(pose[HIPS].translation.y, 0.95));
    assert!(quat_approx(pose[SPINE].rotation, rot_x(0.15)));
}

#[test]
fn unknown_b_clip_plays_a_alone() {
    let cache = rig_cache();
    let mut params = LayerParams {
        base: BaseLayer {
            a: ClipSlot::new("Idle"),
            b: ClipSlot::new("Nope"),
            blend: 1.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.3);
    assert!(approx(pose[HIPS].translation.y, 1.05));
}

#[test]
fn graph_advances_slot_time() {
    let cache = rig_cache();
    let mut params = idle_base();
    let mut graph = PoseBlendGraph::new();
    let mut out = LocalPose::default();

    graph.evaluate(&mut params, &cache, 0.3, &mut out);
    graph.evaluate(&mut params, &cache, 0.3, &mut out);
    assert!(approx(params.base.a.time, 0.6));
    assert!(approx(out[HIPS].translation.y, 1.1));
}

// ============================================================================
// Upper body
// ============================================================================

#[test]
fn upper_body_overlay_only_touches_masked_nodes() {
    let cache = rig_cache();
    let mut params = LayerParams {
        upper_body: UpperBodyLayer {
            enabled: true,
            a: ClipSlot::new("Wave"),
            ..Default::default()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[UPPER_ARM_L].rotation, rot_z(1.0)));
    // Wave keys the hips at y = 5, outside the mask
    assert!(approx(pose[HIPS].translation.y, 1.0));
    assert_eq!(pose[UPPER_LEG_L], cache.bind_pose()[UPPER_LEG_L]);
}

#[test]
fn upper_body_weight_scales_overlay() {
    let cache = rig_cache();
    let mut params = LayerParams {
        upper_body: UpperBodyLayer {
            enabled: true,
            weight: 0.5,
            a: ClipSlot::new("Wave"),
            ..Default::default()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[UPPER_ARM_L].rotation, rot_z(0.5)));
}

#[test]
fn upper_body_mask_follows_keywords() {
    let cache = rig_cache();
    let active: Vec<usize> = cache.upper_body().active_nodes().collect();
    assert_eq!(active, vec![SPINE, CHEST, SHOULDER_L, UPPER_ARM_L, LOWER_ARM_L, HAND_L]);
}

// ============================================================================
// Additive
// ============================================================================

fn lean_additive() -> AdditiveLayer {
    let mut clip = ClipSlot::new("Lean").at(0.5);
    clip.paused = true;
    AdditiveLayer {
        enabled: true,
        clip,
        ..Default::default()
    }
}

#[test]
fn additive_applies_difference_to_own_reference() {
    let cache = rig_cache();
    let mut params = LayerParams {
        additive: lean_additive(),
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[SPINE].rotation, rot_x(0.2)));
    assert!(approx(pose[SPINE].translation.y, 0.2));
    assert!(approx(pose[HIPS].translation.y, 1.0));
}

#[test]
fn additive_weight_scales_delta() {
    let cache = rig_cache();
    let mut params = LayerParams {
        additive: AdditiveLayer {
            weight: 0.5,
            ..lean_additive()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[SPINE].rotation, rot_x(0.1)));
}

#[test]
fn additive_against_other_reference_clip() {
    let cache = rig_cache();
    let mut params = LayerParams {
        additive: AdditiveLayer {
            reference_clip: Some("Run".to_string()),
            ..lean_additive()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    // Lean 0.2 minus Run 0.3 on the spine
    assert!(quat_approx(pose[SPINE].rotation, rot_x(-0.1)));
    // Lean keeps bind hips (y = 1.0), Run lowers them to 0.9
    assert!(approx(pose[HIPS].translation.y, 1.1));
}

#[test]
fn additive_upper_body_mask_spares_hips() {
    let cache = rig_cache();
    let mut params = LayerParams {
        additive: AdditiveLayer {
            reference_clip: Some("Run".to_string()),
            mask: AdditiveMask::UpperBody,
            ..lean_additive()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[SPINE].rotation, rot_x(-0.1)));
    assert!(approx(pose[HIPS].translation.y, 1.0));
}

#[test]
fn additive_with_missing_reference_is_skipped() {
    let cache = rig_cache();
    let mut params = LayerParams {
        additive: AdditiveLayer {
            reference_clip: Some("Nope".to_string()),
            ..lean_additive()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[SPINE].rotation, Quat::IDENTITY));
}

#[test]
fn additive_scale_ignores_zero_reference_axis() {
    let mut pose = LocalPose::identity(1);
    let additive = LocalPose::new(vec![LocalTransform::new(
        Vec3::splat(2.0),
        Quat::IDENTITY,
        Vec3::ZERO,
    )]);
    let reference = LocalPose::new(vec![LocalTransform::new(
        Vec3::new(0.0, 1.0, 1.0),
        Quat::IDENTITY,
        Vec3::ZERO,
    )]);

    pose.apply_additive(&additive, &reference, None, 1.0);
    let scale = pose[0].scale;
    assert!(approx(scale.x, 1.0));
    assert!(approx(scale.y, 2.0));
    assert!(approx(scale.z, 2.0));
    assert!(scale.is_finite());
}

// ============================================================================
// Procedural
// ============================================================================

#[test]
fn noise_only_moves_upper_body_nodes() {
    let cache = rig_cache();
    let mut plain = idle_base();
    let mut noisy = LayerParams {
        noise: ProceduralNoise {
            enabled: true,
            amplitude: 0.05,
            frequency: 2.0,
            seed: 11,
        },
        ..idle_base()
    };

    let (_, reference) = evaluate(&mut plain, &cache, 0.1);
    let (_, pose) = evaluate(&mut noisy, &cache, 0.1);

    for node in [ROOT, HIPS, UPPER_LEG_L, LOWER_LEG_L, FOOT_L] {
        assert_eq!(pose[node], reference[node], "node {node}");
    }
    for node in cache.upper_body().active_nodes() {
        let angle = pose[node].rotation.angle_between(reference[node].rotation);
        assert!(angle < 0.1, "node {node} moved {angle} rad");
    }
}

#[test]
fn noise_is_reproducible_for_a_seed() {
    let cache = rig_cache();
    let params = LayerParams {
        noise: ProceduralNoise {
            enabled: true,
            amplitude: 0.05,
            frequency: 2.0,
            seed: 3,
        },
        ..idle_base()
    };

    let (_, first) = evaluate(&mut params.clone(), &cache, 0.25);
    let (_, second) = evaluate(&mut params.clone(), &cache, 0.25);
    assert_eq!(first, second);
}

#[test]
fn aim_spreads_yaw_over_spine() {
    let cache = rig_cache();
    assert_eq!(cache.spine_nodes(), &[SPINE, CHEST]);

    let mut params = LayerParams {
        aim: AimOffset {
            enabled: true,
            yaw: 0.6,
            ..Default::default()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[SPINE].rotation, rot_y(0.3)));
    assert!(quat_approx(pose[CHEST].rotation, rot_y(0.3)));

    let (_, chest, _) = compute_global(cache.parents(), &pose, CHEST).to_scale_rotation_translation();
    assert!(quat_approx(chest, rot_y(0.6)));
}

#[test]
fn aim_weight_scales_yaw() {
    let cache = rig_cache();
    let mut params = LayerParams {
        aim: AimOffset {
            enabled: true,
            yaw: 0.6,
            weight: 0.5,
            ..Default::default()
        },
        ..idle_base()
    };

    let (_, pose) = evaluate(&mut params, &cache, 0.0);
    assert!(quat_approx(pose[SPINE].rotation, rot_y(0.15)));
}
