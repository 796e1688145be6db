//! Animation Configuration
//!
//! Pure data structures with `Default` impls, following the same pattern
//! as the post-processing settings: the external gameplay or editor layer
//! fills them in (directly or from JSON via serde) and hands them to the
//! [`AnimationWorld`](crate::runtime::AnimationWorld).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! let config = AnimationConfig {
//!     sampling: SamplingConfig { precompute: false, ..Default::default() },
//!     ..Default::default()
//! };
//! let world = AnimationWorld::with_config(config);
//! ```

use serde::{Deserialize, Serialize};

use crate::skeleton::BoneClassifier;

/// Default upper-body keywords (substring, case-insensitive).
pub const DEFAULT_UPPER_BODY_KEYWORDS: &[&str] = &[
    "spine", "chest", "neck", "head", "clavicle", "shoulder", "arm", "hand", "finger", "thumb",
];

/// Default spine keywords used to pick aim-offset nodes.
pub const DEFAULT_SPINE_KEYWORDS: &[&str] = &["spine", "chest"];

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub sampling: SamplingConfig,
    pub ik: IkSettings,
    pub classification: ClassificationConfig,
}

// ============================================================================
// Sampling
// ============================================================================

/// Controls the precomputed fixed-rate sample tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Build per-clip sample tables when an entity's runtime cache is built.
    pub precompute: bool,
    /// Samples per second of the precomputed tables.
    pub sample_rate: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            precompute: true,
            sample_rate: 30.0,
        }
    }
}

// ============================================================================
// IK
// ============================================================================

/// CCD solver budget shared by every chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSettings {
    /// Outer CCD iterations per chain per tick.
    pub iterations: u32,
    /// Tip-to-target distance at which a chain counts as solved.
    pub tolerance: f32,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            iterations: 5,
            tolerance: 1e-3,
        }
    }
}

// ============================================================================
// Bone classification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub upper_body_keywords: Vec<String>,
    pub spine_keywords: Vec<String>,
    /// Number of spine nodes sharing the aim-offset yaw.
    pub aim_spine_count: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            upper_body_keywords: DEFAULT_UPPER_BODY_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            spine_keywords: DEFAULT_SPINE_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            aim_spine_count: 3,
        }
    }
}

impl ClassificationConfig {
    #[must_use]
    pub fn upper_body(&self) -> BoneClassifier {
        BoneClassifier::new(&self.upper_body_keywords)
    }

    #[must_use]
    pub fn spine(&self) -> BoneClassifier {
        BoneClassifier::new(&self.spine_keywords)
    }
}
