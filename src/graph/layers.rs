//! Layer parameters
//!
//! Plain data written by gameplay code every tick and read by the
//! [`PoseBlendGraph`](crate::graph::PoseBlendGraph). Every struct is
//! `serde`-enabled so an editor can persist layer presets as JSON.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::ClipSlot;

// ============================================================================
// Root
// ============================================================================

/// Full set of layer inputs for one animated entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerParams {
    pub base: BaseLayer,
    pub upper_body: UpperBodyLayer,
    pub additive: AdditiveLayer,
    pub noise: ProceduralNoise,
    pub aim: AimOffset,
    pub ik_chains: Vec<IkChainDescriptor>,
}

// ============================================================================
// Cross-fade
// ============================================================================

/// When a timed cross-fade begins ramping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeStart {
    #[default]
    Immediate,
    /// Once clip A's normalized time reaches `exit`.
    AtExitTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeCurve {
    #[default]
    Linear,
    SmoothStep,
}

impl FadeCurve {
    #[inline]
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Timer-driven A→B blend.
///
/// While enabled the layer's `blend` is owned by the timer: it ramps from
/// 0 to 1 over `duration` seconds and then stays at exactly 1.0 until the
/// A/B clip assignment changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossFadeConfig {
    pub enabled: bool,
    pub start: FadeStart,
    /// Normalized time of clip A that starts an [`FadeStart::AtExitTime`] fade.
    pub exit: f32,
    /// Normalized start time of clip B when it is (re)assigned.
    pub entry: f32,
    /// Ramp length in seconds.
    pub duration: f32,
    pub curve: FadeCurve,
}

impl Default for CrossFadeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start: FadeStart::Immediate,
            exit: 0.0,
            entry: 0.0,
            duration: 0.25,
            curve: FadeCurve::Linear,
        }
    }
}

// ============================================================================
// Clip layers
// ============================================================================

/// Base locomotion layer: clip A blended toward clip B.
///
/// Without a clip in `a` the entity shows its bind pose and every later
/// layer (and IK) is skipped. Without a clip in `b`, clip A is used alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseLayer {
    pub a: ClipSlot,
    pub b: ClipSlot,
    /// 0 = A, 1 = B.
    pub blend: f32,
    pub cross_fade: CrossFadeConfig,
}

impl BaseLayer {
    #[must_use]
    pub fn single(clip: impl Into<String>) -> Self {
        Self {
            a: ClipSlot::new(clip),
            ..Self::default()
        }
    }
}

/// Masked overlay applied to upper-body-classified nodes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpperBodyLayer {
    pub enabled: bool,
    /// Overall strength of the overlay.
    pub weight: f32,
    pub a: ClipSlot,
    pub b: ClipSlot,
    pub blend: f32,
    pub cross_fade: CrossFadeConfig,
}

impl Default for UpperBodyLayer {
    fn default() -> Self {
        Self {
            enabled: false,
            weight: 1.0,
            a: ClipSlot::default(),
            b: ClipSlot::default(),
            blend: 0.0,
            cross_fade: CrossFadeConfig::default(),
        }
    }
}

/// Which nodes receive the additive delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdditiveMask {
    #[default]
    All,
    UpperBody,
}

/// Difference layer: `clip - reference` added on top of the current pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveLayer {
    pub enabled: bool,
    pub weight: f32,
    pub clip: ClipSlot,
    /// Clip providing the reference pose. `None` uses `clip` itself.
    pub reference_clip: Option<String>,
    /// Fixed time (seconds) at which the reference pose is sampled.
    pub reference_time: f32,
    pub mask: AdditiveMask,
}

impl Default for AdditiveLayer {
    fn default() -> Self {
        Self {
            enabled: false,
            weight: 1.0,
            clip: ClipSlot::default(),
            reference_clip: None,
            reference_time: 0.0,
            mask: AdditiveMask::All,
        }
    }
}

// ============================================================================
// Procedural
// ============================================================================

/// Low-amplitude rotational jitter on upper-body nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralNoise {
    pub enabled: bool,
    /// Peak rotation per axis, radians.
    pub amplitude: f32,
    /// Noise lattice points per second.
    pub frequency: f32,
    pub seed: u32,
}

impl Default for ProceduralNoise {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 0.02,
            frequency: 0.5,
            seed: 0,
        }
    }
}

/// Yaw spread evenly across the aim spine nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimOffset {
    pub enabled: bool,
    /// Total yaw in radians.
    pub yaw: f32,
    pub weight: f32,
    /// Rotation axis in each spine node's parent space.
    pub axis: Vec3,
}

impl Default for AimOffset {
    fn default() -> Self {
        Self {
            enabled: false,
            yaw: 0.0,
            weight: 1.0,
            axis: Vec3::Y,
        }
    }
}

// ============================================================================
// IK
// ============================================================================

/// One CCD chain ending at `tip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkChainDescriptor {
    pub enabled: bool,
    pub tip: String,
    /// Number of joints above the tip that may rotate.
    pub chain_length: usize,
    /// Target position in model space.
    pub target: Vec3,
    pub weight: f32,
}

impl Default for IkChainDescriptor {
    fn default() -> Self {
        Self {
            enabled: true,
            tip: String::new(),
            chain_length: 2,
            target: Vec3::ZERO,
            weight: 1.0,
        }
    }
}

impl IkChainDescriptor {
    #[must_use]
    pub fn new(tip: impl Into<String>, chain_length: usize, target: Vec3) -> Self {
        Self {
            tip: tip.into(),
            chain_length,
            target,
            ..Self::default()
        }
    }
}
