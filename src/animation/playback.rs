use serde::{Deserialize, Serialize};

/// Playback state of one clip assignment: which clip, where in it, how fast.
///
/// Time is in seconds. Gameplay code writes `clip`, `speed` and `looping`;
/// the pose graph advances `time` once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSlot {
    pub clip: Option<String>,
    pub time: f32,
    /// Signed playback rate. Negative plays backwards.
    pub speed: f32,
    pub looping: bool,
    pub paused: bool,
}

impl Default for ClipSlot {
    fn default() -> Self {
        Self {
            clip: None,
            time: 0.0,
            speed: 1.0,
            looping: true,
            paused: false,
        }
    }
}

impl ClipSlot {
    #[must_use]
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: Some(clip.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn at(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    #[inline]
    #[must_use]
    pub fn clip_name(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    /// Advances time by `dt * speed` seconds.
    ///
    /// Looping slots wrap into `[0, duration)` in both directions; one-shot
    /// slots clamp to `[0, duration]`.
    pub fn advance(&mut self, dt: f32, duration: f32) {
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        if self.paused {
            return;
        }

        self.time += dt * self.speed;
        self.time = wrap_time(self.time, duration, self.looping);
    }

    /// Position in the clip as a fraction of its duration.
    #[must_use]
    pub fn normalized_time(&self, duration: f32) -> f32 {
        if duration <= 0.0 {
            return 0.0;
        }
        (self.time / duration).clamp(0.0, 1.0)
    }

    /// A one-shot slot that reached the end in its direction of travel.
    #[must_use]
    pub fn is_finished(&self, duration: f32) -> bool {
        if self.looping {
            return false;
        }
        if self.speed >= 0.0 {
            self.time >= duration
        } else {
            self.time <= 0.0
        }
    }
}

/// Maps a raw time onto the clip range.
#[inline]
#[must_use]
pub fn wrap_time(time: f32, duration: f32, looping: bool) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    if looping {
        let t = time.rem_euclid(duration);
        // rem_euclid can round up to `duration` for tiny negative inputs
        if t >= duration { 0.0 } else { t }
    } else {
        time.clamp(0.0, duration)
    }
}
