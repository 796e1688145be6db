//! Clip Sampler
//!
//! Evaluates a clip at a point in time into one [`LocalTransform`] per
//! skeleton node.
//!
//! # Algorithm
//!
//! 1. Seconds are converted to the clip's tick rate, then wrapped
//!    (looping) or clamped (one-shot) to `[0, duration]`.
//! 2. The output starts as the bind pose, so nodes without a channel keep
//!    their rest transform verbatim.
//! 3. Each bound channel samples translation / rotation / scale through its
//!    own [`KeyframeCursor`]; an empty channel keeps the bind value for that
//!    channel only, which stops partially keyed bones collapsing to the
//!    origin.
//! 4. Scale axes that resolve to ~0 are floored to 1.

use crate::animation::binder::ClipBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::playback::wrap_time;
use crate::animation::pose::LocalPose;
use crate::animation::tracks::KeyframeCursor;
use crate::skeleton::LocalTransform;

/// Per-channel cursors (translation, rotation, scale) of one playback slot.
#[derive(Debug, Clone, Default)]
pub struct ClipCursors {
    cursors: Vec<[KeyframeCursor; 3]>,
}

impl ClipCursors {
    fn prepare(&mut self, channel_count: usize) -> &mut [[KeyframeCursor; 3]] {
        if self.cursors.len() != channel_count {
            self.cursors.clear();
            self.cursors
                .resize(channel_count, [KeyframeCursor::default(); 3]);
        }
        &mut self.cursors
    }

    pub fn reset(&mut self) {
        self.cursors.clear();
    }
}

/// Converts seconds to clip ticks inside the playable range.
#[inline]
#[must_use]
pub fn clip_ticks(clip: &AnimationClip, time_seconds: f32, looping: bool) -> f32 {
    wrap_time(time_seconds * clip.ticks_per_second, clip.duration, looping)
}

/// Samples `clip` at `time_seconds` into `out`.
pub fn sample_clip_into(
    clip: &AnimationClip,
    binding: &ClipBinding,
    bind_pose: &LocalPose,
    time_seconds: f32,
    looping: bool,
    cursors: &mut ClipCursors,
    out: &mut LocalPose,
) {
    out.copy_from(bind_pose);

    let ticks = clip_ticks(clip, time_seconds, looping);
    let cursors = cursors.prepare(clip.channels.len());

    for ((channel, node), cursor) in clip
        .channels
        .iter()
        .zip(binding.nodes.iter())
        .zip(cursors.iter_mut())
    {
        let Some(node) = *node else {
            continue;
        };
        let Some(bind) = bind_pose.get(node) else {
            continue;
        };

        let [t_cursor, r_cursor, s_cursor] = cursor;
        let translation = channel
            .translations
            .sample_with_cursor(ticks, t_cursor)
            .unwrap_or(bind.translation);
        let rotation = channel
            .rotations
            .sample_with_cursor(ticks, r_cursor)
            .map_or(bind.rotation, glam::Quat::normalize);
        let scale = channel
            .scales
            .sample_with_cursor(ticks, s_cursor)
            .unwrap_or(bind.scale);

        out[node] = LocalTransform::new(scale, rotation, translation).with_scale_floor();
    }
}

/// Allocating convenience wrapper around [`sample_clip_into`].
#[must_use]
pub fn sample_clip(
    clip: &AnimationClip,
    binding: &ClipBinding,
    bind_pose: &LocalPose,
    time_seconds: f32,
    looping: bool,
) -> LocalPose {
    let mut out = LocalPose::default();
    let mut cursors = ClipCursors::default();
    sample_clip_into(
        clip,
        binding,
        bind_pose,
        time_seconds,
        looping,
        &mut cursors,
        &mut out,
    );
    out
}
