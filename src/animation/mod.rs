//! Clip data and sampling
//!
//! - [`KeyframeTrack`]: time-ordered keys with cursor-accelerated lookup
//! - [`AnimationClip`]: named set of per-node channels, timed in ticks
//! - [`Binder`]: resolves channels to skeleton node indices
//! - [`sample_clip_into`]: on-the-fly evaluation into a [`LocalPose`]
//! - [`PrecomputedClip`]: fixed-rate sample table with O(1) lookup
//! - [`ClipSlot`]: per-assignment playback time, speed and loop flag

mod values;
pub mod binder;
pub mod clip;
pub mod playback;
pub mod pose;
pub mod precompute;
pub mod sampler;
pub mod tracks;

pub use binder::{Binder, ClipBinding};
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND, NodeChannel};
pub use playback::{ClipSlot, wrap_time};
pub use pose::LocalPose;
pub use precompute::PrecomputedClip;
pub use sampler::{ClipCursors, sample_clip, sample_clip_into};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
