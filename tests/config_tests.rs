//! Configuration Tests
//!
//! Tests for:
//! - Default values of every settings struct
//! - Partial JSON documents filled in from defaults
//! - Layer presets through serde
//! - Classification keywords feeding the upper-body mask and aim spine
//! - Unusable sample rates falling back to keyframe sampling

mod common;

use glam::Vec3;

use stance::animation::ClipSlot;
use stance::config::{AnimationConfig, ClassificationConfig, IkSettings, SamplingConfig};
use stance::graph::{FadeCurve, FadeStart, LayerParams};
use stance::skeleton::BoneClassifier;

use common::*;

const EPSILON: f32 = 1e-6;

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn defaults_match_documented_values() {
    let config = AnimationConfig::default();

    assert!(config.sampling.precompute);
    assert!((config.sampling.sample_rate - 30.0).abs() < EPSILON);
    assert_eq!(config.ik.iterations, 5);
    assert!((config.ik.tolerance - 1e-3).abs() < EPSILON);
    assert_eq!(config.classification.aim_spine_count, 3);
    assert!(config.classification.upper_body_keywords.contains(&"clavicle".to_string()));
    assert_eq!(config.classification.spine_keywords, vec!["spine", "chest"]);
}

#[test]
fn layer_defaults_are_inert() {
    let params = LayerParams::default();

    assert!(params.base.a.clip.is_none());
    assert!(!params.base.cross_fade.enabled);
    assert!((params.base.cross_fade.duration - 0.25).abs() < EPSILON);
    assert!(!params.upper_body.enabled);
    assert!((params.upper_body.weight - 1.0).abs() < EPSILON);
    assert!(!params.additive.enabled);
    assert!(!params.noise.enabled);
    assert!(!params.aim.enabled);
    assert_eq!(params.aim.axis, Vec3::Y);
    assert!(params.ik_chains.is_empty());
}

// ============================================================================
// Serde
// ============================================================================

#[test]
fn partial_config_json_keeps_defaults() {
    let json = r#"{
        "sampling": { "precompute": false },
        "ik": { "iterations": 12 }
    }"#;

    let config: AnimationConfig = serde_json::from_str(json).unwrap();

    assert_eq!(
        config.sampling,
        SamplingConfig {
            precompute: false,
            sample_rate: 30.0,
        }
    );
    assert_eq!(
        config.ik,
        IkSettings {
            iterations: 12,
            tolerance: 1e-3,
        }
    );
    assert_eq!(config.classification, ClassificationConfig::default());
}

#[test]
fn layer_preset_parses_from_json() {
    let json = r#"{
        "base": {
            "a": { "clip": "Idle" },
            "b": { "clip": "Run", "speed": 1.5 },
            "cross_fade": { "enabled": true, "start": "AtExitTime", "exit": 0.8, "curve": "SmoothStep" }
        },
        "aim": { "enabled": true, "yaw": 0.5 },
        "ik_chains": [
            { "tip": "Hand_L", "target": [1.0, 2.0, 0.5] }
        ]
    }"#;

    let params: LayerParams = serde_json::from_str(json).unwrap();

    assert_eq!(params.base.a, ClipSlot::new("Idle"));
    assert_eq!(params.base.b, ClipSlot::new("Run").with_speed(1.5));
    let fade = &params.base.cross_fade;
    assert!(fade.enabled);
    assert_eq!(fade.start, FadeStart::AtExitTime);
    assert_eq!(fade.curve, FadeCurve::SmoothStep);
    assert!((fade.duration - 0.25).abs() < EPSILON);

    assert!(params.aim.enabled);
    assert!((params.aim.weight - 1.0).abs() < EPSILON);

    let chain = &params.ik_chains[0];
    assert!(chain.enabled);
    assert_eq!(chain.chain_length, 2);
    assert_eq!(chain.target, Vec3::new(1.0, 2.0, 0.5));
}

#[test]
fn layer_params_survive_json_round_trip() {
    let mut params = LayerParams::default();
    params.upper_body.enabled = true;
    params.upper_body.a = ClipSlot::new("Wave").looping(false);
    params.noise.seed = 7;

    let json = serde_json::to_string(&params).unwrap();
    let back: LayerParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back, params);
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn default_keywords_split_the_rig() {
    let cache = rig_cache();
    let upper: Vec<usize> = cache.upper_body().active_nodes().collect();

    assert_eq!(upper, vec![SPINE, CHEST, SHOULDER_L, UPPER_ARM_L, LOWER_ARM_L, HAND_L]);
    assert_eq!(cache.spine_nodes(), &[SPINE, CHEST]);
}

#[test]
fn custom_keywords_change_mask_and_spine() {
    let mut config = AnimationConfig::default();
    config.classification.upper_body_keywords = vec!["LEG".to_string()];
    config.classification.spine_keywords = vec!["hips".to_string(), "spine".to_string()];
    config.classification.aim_spine_count = 1;

    let cache = rig_cache_with(&config);
    let upper: Vec<usize> = cache.upper_body().active_nodes().collect();

    assert_eq!(upper, vec![UPPER_LEG_L, LOWER_LEG_L]);
    assert_eq!(cache.spine_nodes(), &[HIPS]);
}

#[test]
fn classifier_ignores_case_and_empty_keywords() {
    let classifier = BoneClassifier::new(["", "Arm"]);

    assert!(classifier.matches("upperarm_l"));
    assert!(classifier.matches("FOREARM"));
    assert!(!classifier.matches("Hips"));
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn invalid_sample_rate_samples_on_the_fly() {
    init_logger();
    let mut config = AnimationConfig::default();
    config.sampling.sample_rate = 0.0;

    let cache = rig_cache_with(&config);
    let idle = cache.clip_index("Idle").unwrap();
    assert!(!cache.is_precomputed(idle));

    let on_the_fly = rig_cache_on_the_fly();
    let mut a = stance::LocalPose::default();
    let mut b = stance::LocalPose::default();
    cache.sample_into(idle, 0.3, true, &mut Default::default(), &mut a);
    on_the_fly.sample_into(idle, 0.3, true, &mut Default::default(), &mut b);
    assert_eq!(a, b);
}
