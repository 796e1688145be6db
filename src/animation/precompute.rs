//! Fixed-rate sample tables.
//!
//! A clip is sampled once per `1 / sample_rate` seconds when an entity's
//! runtime cache is built. Runtime lookups are then an O(1) bucket index
//! plus one blend between the two neighbouring frames, skipping all
//! per-channel key searches. The last frame sits exactly on the clip end
//! so the final partial interval is interpolated with its true width.
//! Clips with stepped tracks never get a table, since blending between
//! frames would ramp across their holds.

use crate::animation::binder::ClipBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::playback::wrap_time;
use crate::animation::pose::LocalPose;
use crate::animation::sampler::{ClipCursors, sample_clip_into};
use crate::errors::{AnimationError, Result};

#[derive(Debug, Clone)]
pub struct PrecomputedClip {
    sample_rate: f32,
    duration_seconds: f32,
    frames: Vec<LocalPose>,
}

impl PrecomputedClip {
    pub fn build(
        clip: &AnimationClip,
        binding: &ClipBinding,
        bind_pose: &LocalPose,
        sample_rate: f32,
    ) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnimationError::InvalidSampleRate(sample_rate));
        }

        let duration_seconds = clip.duration_seconds().max(0.0);
        let last = (duration_seconds * sample_rate).ceil() as usize;

        let mut cursors = ClipCursors::default();
        let frames = (0..=last)
            .map(|i| {
                let t = frame_time(i, sample_rate, duration_seconds);
                let mut pose = LocalPose::default();
                sample_clip_into(clip, binding, bind_pose, t, false, &mut cursors, &mut pose);
                pose
            })
            .collect();

        Ok(Self {
            sample_rate,
            duration_seconds,
            frames,
        })
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration_seconds
    }

    /// Looks up `time_seconds` and blends the two bracketing frames into `out`.
    pub fn sample_into(&self, time_seconds: f32, looping: bool, out: &mut LocalPose) {
        let last = self.frames.len().saturating_sub(1);
        if last == 0 {
            if let Some(frame) = self.frames.first() {
                out.copy_from(frame);
            }
            return;
        }

        let t = wrap_time(time_seconds, self.duration_seconds, looping);
        let i0 = ((t * self.sample_rate).floor() as usize).min(last);
        let i1 = (i0 + 1).min(last);

        let t0 = frame_time(i0, self.sample_rate, self.duration_seconds);
        let t1 = frame_time(i1, self.sample_rate, self.duration_seconds);
        let alpha = if t1 - t0 > 1e-6 {
            ((t - t0) / (t1 - t0)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        out.blend_into(&self.frames[i0], &self.frames[i1], alpha);
    }
}

#[inline]
fn frame_time(index: usize, sample_rate: f32, duration: f32) -> f32 {
    (index as f32 / sample_rate).min(duration)
}
