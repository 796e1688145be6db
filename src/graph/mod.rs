//! Pose Blend Graph
//!
//! - [`LayerParams`]: per-tick layer inputs written by gameplay code
//! - [`PoseBlendGraph`]: per-entity evaluator holding cursors, timers and scratch poses
//! - [`CrossFadeState`]: timer behind a cross-faded A/B pair

pub mod crossfade;
pub mod evaluator;
pub mod layers;
pub mod procedural;

pub use crossfade::CrossFadeState;
pub use evaluator::{GraphOutcome, PoseBlendGraph};
pub use layers::{
    AdditiveLayer, AdditiveMask, AimOffset, BaseLayer, CrossFadeConfig, FadeCurve, FadeStart,
    IkChainDescriptor, LayerParams, ProceduralNoise, UpperBodyLayer,
};
