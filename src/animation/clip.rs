use glam::{Quat, Vec3};

use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::errors::{AnimationError, Result};

/// Tick rate assumed when the importer reports none.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Keyframe data for one node. Any of the three channels may be empty.
#[derive(Debug, Clone)]
pub struct NodeChannel {
    pub node_name: String,
    pub translations: KeyframeTrack<Vec3>,
    pub rotations: KeyframeTrack<Quat>,
    pub scales: KeyframeTrack<Vec3>,
}

impl NodeChannel {
    #[must_use]
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            translations: KeyframeTrack::empty(),
            rotations: KeyframeTrack::empty(),
            scales: KeyframeTrack::empty(),
        }
    }

    #[must_use]
    pub fn with_translations(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.translations = track;
        self
    }

    #[must_use]
    pub fn with_rotations(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotations = track;
        self
    }

    #[must_use]
    pub fn with_scales(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scales = track;
        self
    }

    fn last_time(&self) -> f32 {
        [
            self.translations.last_time(),
            self.rotations.last_time(),
            self.scales.last_time(),
        ]
        .into_iter()
        .flatten()
        .fold(0.0_f32, f32::max)
    }

    fn has_step_track(&self) -> bool {
        [
            self.translations.interpolation,
            self.rotations.interpolation,
            self.scales.interpolation,
        ]
        .contains(&InterpolationMode::Step)
    }

    fn validate(&self) -> Result<()> {
        check_track(&self.node_name, &self.translations.times, self.translations.values.len())?;
        check_track(&self.node_name, &self.rotations.times, self.rotations.values.len())?;
        check_track(&self.node_name, &self.scales.times, self.scales.values.len())
    }
}

fn check_track(node: &str, times: &[f32], values: usize) -> Result<()> {
    if times.len() != values {
        return Err(AnimationError::TrackLengthMismatch {
            node: node.to_string(),
            times: times.len(),
            values,
        });
    }
    if let Some(key) = times.windows(2).position(|w| w[1] < w[0]) {
        return Err(AnimationError::UnsortedKeyframes {
            node: node.to_string(),
            key: key + 1,
        });
    }
    Ok(())
}

/// A named, timed set of per-node keyframe channels.
///
/// `duration` and key times are expressed in ticks; nodes without a
/// channel keep their bind pose.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    /// Validates every channel. A non-positive `duration` is replaced by
    /// the last key time found in the channels.
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        channels: Vec<NodeChannel>,
    ) -> Result<Self> {
        for channel in &channels {
            channel.validate()?;
        }

        let duration = if duration > 0.0 {
            duration
        } else {
            channels
                .iter()
                .map(NodeChannel::last_time)
                .fold(0.0_f32, f32::max)
        };

        let ticks_per_second = if ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        };

        Ok(Self {
            name: name.into(),
            duration,
            ticks_per_second,
            channels,
        })
    }

    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    /// True when any channel holds keys instead of interpolating.
    /// Such clips cannot be reproduced by blending fixed-rate frames.
    #[must_use]
    pub fn has_step_tracks(&self) -> bool {
        self.channels.iter().any(NodeChannel::has_step_track)
    }

    #[must_use]
    pub fn channel(&self, node_name: &str) -> Option<&NodeChannel> {
        self.channels.iter().find(|c| c.node_name == node_name)
    }
}
